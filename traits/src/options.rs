use core::fmt;

/// How members whose value is `None` are serialized.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum NullHandling {
  /// Write the member with the value `null`.
  #[default]
  Include,
  /// Omit the member entirely.
  Omit,
}

/// How members not declared by the type being deserialized are handled.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum UnknownMembers {
  /// Skip the member, still validating its value.
  #[default]
  Skip,
  /// Fail with `JsonError::UnknownMember`.
  Fail,
}

/// The policy mapping declared member names to their names within JSON.
///
/// Members with an explicitly specified name are never renamed.
#[derive(Clone, Copy, Default)]
pub enum MemberNaming {
  /// Use the declared name as-is.
  #[default]
  Verbatim,
  /// Convert `snake_case` and `PascalCase` names to `camelCase`.
  CamelCase,
  /// Apply a custom function.
  Custom(fn(&str) -> String),
}

impl MemberNaming {
  /// Apply this policy to a declared name.
  pub fn apply(self, declared: &str) -> String {
    match self {
      MemberNaming::Verbatim => declared.to_string(),
      MemberNaming::CamelCase => camel_case(declared),
      MemberNaming::Custom(rename) => rename(declared),
    }
  }
}

impl fmt::Debug for MemberNaming {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      MemberNaming::Verbatim => "Verbatim",
      MemberNaming::CamelCase => "CamelCase",
      MemberNaming::Custom(_) => "Custom",
    })
  }
}

fn camel_case(declared: &str) -> String {
  let mut result = String::with_capacity(declared.len());
  let mut upper_next = false;
  for char in declared.chars() {
    if char == '_' {
      // Leading underscores are dropped without capitalizing what follows
      upper_next = !result.is_empty();
      continue;
    }
    if result.is_empty() {
      result.extend(char.to_lowercase());
    } else if upper_next {
      result.extend(char.to_uppercase());
    } else {
      result.push(char);
    }
    upper_next = false;
  }
  result
}

/// The options for a [`crate::JsonSerializer`].
#[derive(Clone, Copy, Debug)]
pub struct Options {
  /// How `None` members are serialized.
  pub null_handling: NullHandling,
  /// How undeclared members are handled when deserializing.
  pub unknown_members: UnknownMembers,
  /// The maximum amount of nested objects and arrays, when reading or writing.
  pub max_depth: usize,
  /// The naming policy for members.
  pub member_naming: MemberNaming,
  /// If member names are matched ignoring ASCII case when deserializing.
  pub case_insensitive: bool,
  /// If anything other than whitespace after the deserialized value is an error.
  pub strict_trailing: bool,
  /// If the output is pretty-printed with two spaces per level.
  pub indent: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      null_handling: NullHandling::Include,
      unknown_members: UnknownMembers::Skip,
      max_depth: 64,
      member_naming: MemberNaming::Verbatim,
      case_insensitive: false,
      strict_trailing: false,
      indent: false,
    }
  }
}

impl Options {
  /// Set how `None` members are serialized.
  #[must_use]
  pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
    self.null_handling = null_handling;
    self
  }

  /// Set how undeclared members are handled when deserializing.
  #[must_use]
  pub fn with_unknown_members(mut self, unknown_members: UnknownMembers) -> Self {
    self.unknown_members = unknown_members;
    self
  }

  /// Set the maximum amount of nested objects and arrays.
  #[must_use]
  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Set the naming policy for members.
  #[must_use]
  pub fn with_member_naming(mut self, member_naming: MemberNaming) -> Self {
    self.member_naming = member_naming;
    self
  }

  /// Set if member names are matched ignoring ASCII case.
  #[must_use]
  pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
    self.case_insensitive = case_insensitive;
    self
  }

  /// Set if trailing non-whitespace is an error.
  #[must_use]
  pub fn with_strict_trailing(mut self, strict_trailing: bool) -> Self {
    self.strict_trailing = strict_trailing;
    self
  }

  /// Set if the output is pretty-printed.
  #[must_use]
  pub fn with_indent(mut self, indent: bool) -> Self {
    self.indent = indent;
    self
  }
}

#[test]
fn camel_case_names() {
  for (declared, expected) in [
    ("first_name", "firstName"),
    ("phone_numbers", "phoneNumbers"),
    ("MyString", "myString"),
    ("zip", "zip"),
    ("_private", "private"),
    ("main_site_", "mainSite"),
    ("", ""),
  ] {
    assert_eq!(MemberNaming::CamelCase.apply(declared), expected);
  }
}
