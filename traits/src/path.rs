use core::fmt;

#[derive(Clone, Debug)]
enum Segment {
  Member(String),
  Index(usize),
}

/// The path to the value currently being read or written, such as `$.sites[1].zip`.
#[derive(Clone, Default, Debug)]
pub(crate) struct Path(Vec<Segment>);

impl Path {
  #[inline(always)]
  pub(crate) fn push_member(&mut self, name: &str) {
    self.0.push(Segment::Member(name.to_string()));
  }

  #[inline(always)]
  pub(crate) fn push_index(&mut self, index: usize) {
    self.0.push(Segment::Index(index));
  }

  #[inline(always)]
  pub(crate) fn pop(&mut self) {
    self.0.pop();
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("$")?;
    for segment in &self.0 {
      match segment {
        Segment::Member(name) => write!(f, ".{name}")?,
        Segment::Index(index) => write!(f, "[{index}]")?,
      }
    }
    Ok(())
  }
}

#[test]
fn path_display() {
  let mut path = Path::default();
  assert_eq!(path.to_string(), "$");
  path.push_member("sites");
  path.push_index(1);
  path.push_member("zip");
  assert_eq!(path.to_string(), "$.sites[1].zip");
  path.pop();
  path.pop();
  assert_eq!(path.to_string(), "$.sites");
}
