use core::cell::RefCell;
use std::{
  rc::Rc,
  sync::Arc,
  collections::{VecDeque, BTreeSet},
};

use graph_json_traits::{
  JsonError, JsonType, JsonSerializer, Options, MemberNaming, NullHandling, UnknownMembers,
};
use graph_json_derive::JsonType;

fn pascal_case(name: &str) -> String {
  name
    .split('_')
    .map(|word| {
      let mut chars = word.chars();
      chars.next().map(|first| first.to_uppercase().chain(chars).collect::<String>()).unwrap_or_default()
    })
    .collect()
}

fn pascal() -> JsonSerializer {
  JsonSerializer::new(Options::default().with_member_naming(MemberNaming::Custom(pascal_case)))
}

fn camel() -> JsonSerializer {
  JsonSerializer::new(Options::default().with_member_naming(MemberNaming::CamelCase))
}

// Deserialize the compact JSON, checking it's serialized back to the same JSON
fn round_trip<T: JsonType>(serializer: &JsonSerializer, json: &str) -> T {
  let value = serializer.from_str::<T>(json).unwrap();
  assert_eq!(serializer.to_string(&value).unwrap(), json);
  value
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug, JsonType)]
enum SampleEnum {
  #[default]
  One = 1,
  Two = 2,
}

#[derive(Clone, PartialEq, Default, Debug, JsonType)]
struct SimpleTestClass {
  my_int16: i16,
  my_int32: i32,
  my_int64: i64,
  my_uint16: u16,
  my_uint32: u32,
  my_uint64: u64,
  my_byte: u8,
  my_signed_byte: i8,
  my_char: char,
  my_string: String,
  my_boolean: bool,
  my_single: f32,
  my_double: f64,
  my_enum: SampleEnum,
  my_int32_array: Vec<i32>,
}

macro_rules! simple_json {
  () => {
    concat!(
      r#"{"MyInt16":1,"MyInt32":2,"MyInt64":-3,"MyUint16":4,"MyUint32":5,"#,
      r#""MyUint64":18446744073709551615,"MyByte":7,"MySignedByte":-8,"MyChar":"a","#,
      r#""MyString":"Hello","MyBoolean":true,"MySingle":1.5,"MyDouble":2.25,"MyEnum":"Two","#,
      r#""MyInt32Array":[1,-2]}"#
    )
  };
}

impl SimpleTestClass {
  fn verify(&self) {
    assert_eq!(self.my_int16, 1);
    assert_eq!(self.my_int32, 2);
    assert_eq!(self.my_int64, -3);
    assert_eq!(self.my_uint16, 4);
    assert_eq!(self.my_uint32, 5);
    assert_eq!(self.my_uint64, u64::MAX);
    assert_eq!(self.my_byte, 7);
    assert_eq!(self.my_signed_byte, -8);
    assert_eq!(self.my_char, 'a');
    assert_eq!(self.my_string, "Hello");
    assert!(self.my_boolean);
    assert!((self.my_single - 1.5).abs() < f32::EPSILON);
    assert!((self.my_double - 2.25).abs() < f64::EPSILON);
    assert_eq!(self.my_enum, SampleEnum::Two);
    assert_eq!(self.my_int32_array, [1, -2]);
  }
}

#[test]
fn simple() {
  round_trip::<SimpleTestClass>(&pascal(), simple_json!()).verify();
}

#[derive(Clone, PartialEq, Default, Debug, JsonType)]
struct SimpleDerivedTestClass {
  #[flatten]
  base: SimpleTestClass,
}

#[derive(Default, JsonType)]
struct TaggedTestClassWithNull {
  tag: String,
  #[flatten]
  base: TestClassWithNull,
}

#[test]
fn flattened() {
  let serializer = pascal();
  let value = round_trip::<SimpleDerivedTestClass>(&serializer, simple_json!());
  value.base.verify();
  assert_eq!(serializer.to_string(&value).unwrap(), serializer.to_string(&value.base).unwrap());

  let value = round_trip::<TaggedTestClassWithNull>(&serializer, r#"{"Tag":"t","MyString":"s"}"#);
  assert_eq!(value.tag, "t");
  assert_eq!(value.base.my_string.as_deref(), Some("s"));
  // The embedded members are matched as any other
  let value = JsonSerializer::new(serializer.options().with_case_insensitive(true))
    .from_str::<TaggedTestClassWithNull>(r#"{"mystring":null,"tag":"u"}"#)
    .unwrap();
  assert_eq!(value.tag, "u");
  assert_eq!(value.base.my_string, None);
}

#[derive(Default, JsonType)]
struct TestClassWithNull {
  my_string: Option<String>,
}

#[test]
fn null_members() {
  let serializer = pascal();
  let value = serializer.from_str::<TestClassWithNull>(r#"{ "MyString" : null }"#).unwrap();
  assert_eq!(value.my_string, None);
  assert_eq!(serializer.to_string(&value).unwrap(), r#"{"MyString":null}"#);

  let omit = JsonSerializer::new(serializer.options().with_null_handling(NullHandling::Omit));
  assert_eq!(omit.to_string(&value).unwrap(), "{}");
  let value = TestClassWithNull { my_string: Some("set".to_string()) };
  assert_eq!(omit.to_string(&value).unwrap(), r#"{"MyString":"set"}"#);
}

#[derive(JsonType)]
struct TestClassWithInitializedProperties {
  my_string: Option<String>,
  my_int: Option<i32>,
}

impl Default for TestClassWithInitializedProperties {
  fn default() -> Self {
    Self { my_string: Some("Hello".to_string()), my_int: Some(1) }
  }
}

#[test]
fn initialized_properties() {
  let serializer = pascal();
  // Explicit `null`s overwrite the initialized values
  let value = serializer
    .from_str::<TestClassWithInitializedProperties>(r#"{"MyString" : null,"MyInt" : null}"#)
    .unwrap();
  assert_eq!(value.my_string, None);
  assert_eq!(value.my_int, None);

  // Absent members keep them
  let value = serializer.from_str::<TestClassWithInitializedProperties>("{}").unwrap();
  assert_eq!(value.my_string.as_deref(), Some("Hello"));
  assert_eq!(value.my_int, Some(1));
}

#[derive(Default, JsonType)]
struct TestClassWithNestedObjectInner {
  my_data: SimpleTestClass,
}

#[derive(Default, JsonType)]
struct TestClassWithNestedObjectOuter {
  my_data: TestClassWithNestedObjectInner,
}

#[test]
fn nested_objects() {
  let serializer = pascal();
  round_trip::<TestClassWithNestedObjectInner>(
    &serializer,
    concat!(r#"{"MyData":"#, simple_json!(), "}"),
  )
  .my_data
  .verify();
  round_trip::<TestClassWithNestedObjectOuter>(
    &serializer,
    concat!(r#"{"MyData":{"MyData":"#, simple_json!(), "}}"),
  )
  .my_data
  .my_data
  .verify();
}

macro_rules! holders {
  ($($name: ident: $ty: ty,)*) => {
    $(
      #[derive(Default, JsonType)]
      struct $name {
        my_data: $ty,
      }
    )*
  };
}

holders! {
  TestClassWithObjectList: Vec<SimpleTestClass>,
  TestClassWithObjectArray: [SimpleTestClass; 2],
  TestClassWithObjectBoxedSlice: Box<[SimpleTestClass]>,
  TestClassWithObjectDeque: VecDeque<SimpleTestClass>,
  TestClassWithObjectRcSlice: Rc<[SimpleTestClass]>,
  TestClassWithObjectArcSlice: Arc<[SimpleTestClass]>,
  TestClassWithStringArray: [String; 2],
  TestClassWithGenericList: Vec<String>,
  TestClassWithGenericBoxedSlice: Box<[String]>,
  TestClassWithGenericDeque: VecDeque<String>,
  TestClassWithGenericSet: BTreeSet<String>,
  TestClassWithGenericRcSlice: Rc<[String]>,
  TestClassWithGenericArcSlice: Arc<[String]>,
}

#[test]
fn collection_shapes() {
  let serializer = pascal();

  let objects = concat!(r#"{"MyData":["#, simple_json!(), ",", simple_json!(), "]}");
  let verify = |items: &[SimpleTestClass]| {
    assert_eq!(items.len(), 2);
    items.iter().for_each(SimpleTestClass::verify);
  };
  verify(&round_trip::<TestClassWithObjectList>(&serializer, objects).my_data);
  verify(&round_trip::<TestClassWithObjectArray>(&serializer, objects).my_data);
  verify(&round_trip::<TestClassWithObjectBoxedSlice>(&serializer, objects).my_data);
  verify(round_trip::<TestClassWithObjectDeque>(&serializer, objects).my_data.make_contiguous());
  verify(&round_trip::<TestClassWithObjectRcSlice>(&serializer, objects).my_data);
  verify(&round_trip::<TestClassWithObjectArcSlice>(&serializer, objects).my_data);

  let strings = r#"{"MyData":["Hello","World"]}"#;
  let verify = |items: Vec<String>| assert_eq!(items, ["Hello", "World"]);
  verify(round_trip::<TestClassWithStringArray>(&serializer, strings).my_data.to_vec());
  verify(round_trip::<TestClassWithGenericList>(&serializer, strings).my_data);
  verify(round_trip::<TestClassWithGenericBoxedSlice>(&serializer, strings).my_data.to_vec());
  verify(round_trip::<TestClassWithGenericDeque>(&serializer, strings).my_data.into());
  verify(round_trip::<TestClassWithGenericSet>(&serializer, strings).my_data.into_iter().collect());
  verify(round_trip::<TestClassWithGenericRcSlice>(&serializer, strings).my_data.to_vec());
  verify(round_trip::<TestClassWithGenericArcSlice>(&serializer, strings).my_data.to_vec());

  // Arrays must have exactly as many elements as declared
  assert!(matches!(
    serializer.from_str::<TestClassWithStringArray>(r#"{"MyData":["Hello"]}"#),
    Err(JsonError::InvalidCast { ref path, offset: 10, .. }) if path == "$.MyData"
  ));
}

#[derive(Default, JsonType)]
struct TestClassWithCycle {
  parent: Option<Rc<RefCell<TestClassWithCycle>>>,
}

#[test]
fn cycles() {
  let serializer = pascal();

  let node = Rc::new(RefCell::new(TestClassWithCycle::default()));
  node.borrow_mut().parent = Some(node.clone());
  let Err(JsonError::CycleDetected { path }) = serializer.to_string(&node) else {
    panic!("serialized a cycle");
  };
  assert_eq!(path, "$.Parent");
  // Break the cycle so the node is dropped
  node.borrow_mut().parent = None;

  // A chain without a cycle is fine
  let root = TestClassWithCycle {
    parent: Some(Rc::new(RefCell::new(TestClassWithCycle {
      parent: Some(Rc::new(RefCell::new(TestClassWithCycle::default()))),
    }))),
  };
  let json = serializer.to_string(&root).unwrap();
  assert_eq!(json, r#"{"Parent":{"Parent":{"Parent":null}}}"#);
  let read = serializer.from_str::<TestClassWithCycle>(&json).unwrap();
  let parent = read.parent.unwrap();
  assert!(parent.borrow().parent.as_ref().unwrap().borrow().parent.is_none());
}

#[derive(Default, JsonType)]
struct LargeDataChildTestClass {
  my_string: String,
  my_string_array: Vec<String>,
}

#[derive(Default, JsonType)]
struct LargeDataTestClass {
  children: Vec<LargeDataChildTestClass>,
  my_string: String,
}

#[test]
fn large_data() {
  let value = LargeDataTestClass {
    children: (0 .. 10)
      .map(|_| LargeDataChildTestClass {
        my_string: "2".repeat(2000),
        my_string_array: vec!["3".repeat(50); 1000],
      })
      .collect(),
    my_string: "1".repeat(1000),
  };

  let serializer = pascal();
  let json = serializer.to_vec(&value).unwrap();
  let value = serializer.from_slice::<LargeDataTestClass>(&json).unwrap();
  assert_eq!(value.my_string, "1".repeat(1000));
  assert_eq!(value.children.len(), 10);
  for child in &value.children {
    assert_eq!(child.my_string.len(), 2000);
    assert!(child.my_string.chars().all(|char| char == '2'));
    assert_eq!(child.my_string_array.len(), 1000);
    assert!(child.my_string_array.iter().all(|string| *string == "3".repeat(50)));
  }
}

#[derive(PartialEq, Default, Debug, JsonType)]
struct BasicJsonAddress {
  street: String,
  city: String,
  zip: i32,
}

#[derive(Default, JsonType)]
struct BasicPerson {
  age: i32,
  first: String,
  last: String,
  phone_numbers: Vec<String>,
  address: BasicJsonAddress,
}

#[derive(Default, JsonType)]
struct BasicCompany {
  sites: Vec<BasicJsonAddress>,
  main_site: BasicJsonAddress,
  name: String,
}

const BASIC_PERSON: &str = r#"{
  "age" : 30,
  "first" : "John",
  "last" : "Smith",
  "phoneNumbers" : [
    "425-000-0000",
    "425-000-0001"
  ],
  "address" : {
    "street" : "1 Microsoft Way",
    "city" : "Redmond",
    "zip" : 98052
  }
}"#;

const BASIC_COMPANY: &str = r#"{
  "name" : "Microsoft",
  "sites" : [
    {
      "street" : "1 Lone Tree Rd S",
      "city" : "Fargo",
      "zip" : 58104
    },
    {
      "street" : "8055 Microsoft Way",
      "city" : "Charlotte",
      "zip" : 28273
    }
  ],
  "mainSite" : {
    "street" : "1 Microsoft Way",
    "city" : "Redmond",
    "zip" : 98052
  }
}"#;

fn redmond() -> BasicJsonAddress {
  BasicJsonAddress {
    street: "1 Microsoft Way".to_string(),
    city: "Redmond".to_string(),
    zip: 98052,
  }
}

fn verify_company(company: &BasicCompany) {
  assert_eq!(company.name, "Microsoft");
  assert_eq!(
    company.sites,
    [
      BasicJsonAddress {
        street: "1 Lone Tree Rd S".to_string(),
        city: "Fargo".to_string(),
        zip: 58104
      },
      BasicJsonAddress {
        street: "8055 Microsoft Way".to_string(),
        city: "Charlotte".to_string(),
        zip: 28273
      },
    ]
  );
  assert_eq!(company.main_site, redmond());
}

#[test]
fn basic_documents() {
  let serializer = camel();

  let person = serializer.from_str::<BasicPerson>(BASIC_PERSON).unwrap();
  assert_eq!(person.age, 30);
  assert_eq!(person.first, "John");
  assert_eq!(person.last, "Smith");
  assert_eq!(person.phone_numbers, ["425-000-0000", "425-000-0001"]);
  assert_eq!(person.address, redmond());

  let company = serializer.from_str::<BasicCompany>(BASIC_COMPANY).unwrap();
  verify_company(&company);

  // Members are written in declaration order, not input order
  let json = serializer.to_string(&company).unwrap();
  assert!(json.starts_with(r#"{"sites":[{"street":"1 Lone Tree Rd S""#));
  assert!(json.ends_with(r#""mainSite":{"street":"1 Microsoft Way","city":"Redmond","zip":98052},"name":"Microsoft"}"#));
  verify_company(&serializer.from_str::<BasicCompany>(&json).unwrap());

  // Pretty-printing
  let pretty = JsonSerializer::new(serializer.options().with_indent(true));
  let json = pretty.to_string(&person).unwrap();
  assert_eq!(
    json,
    r#"{
  "age": 30,
  "first": "John",
  "last": "Smith",
  "phoneNumbers": [
    "425-000-0000",
    "425-000-0001"
  ],
  "address": {
    "street": "1 Microsoft Way",
    "city": "Redmond",
    "zip": 98052
  }
}"#
  );
  assert_eq!(serializer.from_str::<BasicPerson>(&json).unwrap().address, redmond());
}

#[test]
fn error_paths() {
  let serializer = camel();
  let Err(JsonError::InvalidCast { path, .. }) =
    serializer.from_str::<BasicCompany>(r#"{"sites":[{},{"zip":"98052"}]}"#)
  else {
    panic!("string was accepted as an integer");
  };
  assert_eq!(path, "$.sites[1].zip");

  let Err(JsonError::TypeMismatch { path, expected, .. }) =
    serializer.from_str::<BasicCompany>(r#"{"mainSite":[]}"#)
  else {
    panic!("array was accepted as an object");
  };
  assert_eq!(path, "$.mainSite");
  assert_eq!(expected, "an object");

  assert!(matches!(
    serializer.from_str::<BasicPerson>(r#"{"age":300000000000}"#),
    Err(JsonError::InvalidCast { offset: 7, .. })
  ));
  assert!(matches!(
    serializer.from_str::<BasicPerson>(r#"{"age":30"#),
    Err(JsonError::MalformedInput { offset: 9, .. })
  ));
}

#[derive(Default, JsonType)]
struct OverridePropertyNameRuntime {
  #[key("blah")]
  my_int16: i16,
}

#[test]
fn explicit_keys() {
  for serializer in [pascal(), camel(), JsonSerializer::default()] {
    let value = serializer.from_str::<OverridePropertyNameRuntime>(r#"{"blah" : 1}"#).unwrap();
    assert_eq!(value.my_int16, 1);
    assert_eq!(serializer.to_string(&value).unwrap(), r#"{"blah":1}"#);
  }
}

#[derive(Default, JsonType)]
struct EmptyClass {}

#[test]
fn empty_class() {
  let serializer = JsonSerializer::default();
  serializer.from_str::<EmptyClass>("{}").unwrap();
  // Unknown members are skipped, though still validated
  serializer.from_str::<EmptyClass>(r#"{"a":[1,{"b":null}],"c":"é"}"#).unwrap();
  assert!(matches!(
    serializer.from_str::<EmptyClass>(r#"{"a":[1,}"#),
    Err(JsonError::MalformedInput { offset: 8, .. })
  ));
  assert_eq!(serializer.to_string(&EmptyClass {}).unwrap(), "{}");

  let strict = JsonSerializer::new(Options::default().with_unknown_members(UnknownMembers::Fail));
  let Err(JsonError::UnknownMember { name, offset, .. }) =
    strict.from_str::<EmptyClass>(r#"{"a":1}"#)
  else {
    panic!("unknown member was accepted");
  };
  assert_eq!(name, "a");
  assert_eq!(offset, 1);
}

#[test]
fn enums() {
  let serializer = JsonSerializer::default();
  assert_eq!(serializer.from_str::<SampleEnum>(r#""One""#).unwrap(), SampleEnum::One);
  assert_eq!(serializer.to_string(&SampleEnum::Two).unwrap(), r#""Two""#);
  assert!(matches!(serializer.from_str::<SampleEnum>(r#""Three""#), Err(JsonError::InvalidCast { .. })));
  // Variants are named, never numbered
  assert!(matches!(serializer.from_str::<SampleEnum>("1"), Err(JsonError::InvalidCast { .. })));
  assert_eq!(
    serializer.from_str::<BTreeSet<SampleEnum>>(r#"["Two","One","Two"]"#).unwrap(),
    BTreeSet::from([SampleEnum::One, SampleEnum::Two])
  );
}

#[derive(Clone, Copy, PartialEq, Debug, JsonType)]
enum Renamed {
  #[key("first")]
  First,
  r#Second,
}

#[derive(Default, JsonType)]
struct Attributed {
  #[key("id")]
  identifier: u32,
  #[readonly]
  computed: String,
  #[skip]
  cache: Vec<u8>,
  r#type: Option<Renamed>,
}

#[derive(JsonType)]
#[readonly]
struct Snapshot {
  taken: u64,
  #[key("items")]
  borrowed: &'static [u8],
}

#[test]
fn attributes() {
  let serializer = JsonSerializer::default();
  let value = Attributed {
    identifier: 5,
    computed: "derived".to_string(),
    cache: vec![1, 2, 3],
    r#type: Some(Renamed::First),
  };
  let json = serializer.to_string(&value).unwrap();
  assert_eq!(json, r#"{"id":5,"computed":"derived","type":"first"}"#);

  // Read-only members are skipped when deserializing
  let read = serializer
    .from_str::<Attributed>(r#"{"id":6,"computed":"ignored","cache":[9],"type":"Second"}"#)
    .unwrap();
  assert_eq!(read.identifier, 6);
  assert_eq!(read.computed, "");
  assert!(read.cache.is_empty());
  assert_eq!(read.r#type, Some(Renamed::Second));

  static ITEMS: [u8; 2] = [1, 2];
  let snapshot = Snapshot { taken: 7, borrowed: &ITEMS };
  assert_eq!(serializer.to_string(&snapshot).unwrap(), r#"{"taken":7,"items":[1,2]}"#);
  assert!(matches!(
    serializer.from_str::<Snapshot>(r#"{"taken":7}"#),
    Err(JsonError::UnsupportedTarget { .. })
  ));
}

#[derive(Default, JsonType)]
struct Wrapper<T: 'static + JsonType + Default> {
  value: T,
  values: Vec<T>,
}

#[test]
fn generics() {
  let serializer = JsonSerializer::default();
  let wrapper = round_trip::<Wrapper<u8>>(&serializer, r#"{"value":1,"values":[2,3]}"#);
  assert_eq!(wrapper.value, 1);
  round_trip::<Wrapper<Wrapper<bool>>>(
    &serializer,
    r#"{"value":{"value":true,"values":[]},"values":[]}"#,
  );
}

#[derive(Default, JsonType)]
struct Node {
  value: u32,
  next: Option<Box<Node>>,
}

#[test]
fn options() {
  // Depth
  let serializer = JsonSerializer::new(Options::default().with_max_depth(3));
  serializer.from_str::<Node>(r#"{"next":{"next":{}}}"#).unwrap();
  assert!(matches!(
    serializer.from_str::<Node>(r#"{"next":{"next":{"next":{}}}}"#),
    Err(JsonError::DepthExceeded { limit: 3 })
  ));
  let deep = Node {
    value: 0,
    next: Some(Box::new(Node {
      value: 1,
      next: Some(Box::new(Node { value: 2, next: Some(Box::new(Node::default())) })),
    })),
  };
  assert!(matches!(serializer.to_string(&deep), Err(JsonError::DepthExceeded { limit: 3 })));

  // Trailing bytes
  let lax = JsonSerializer::default();
  assert_eq!(lax.from_str::<Node>(r#"{"value":1} trailing"#).unwrap().value, 1);
  let strict = JsonSerializer::new(Options::default().with_strict_trailing(true));
  assert_eq!(strict.from_str::<Node>("{\"value\":1} \n").unwrap().value, 1);
  assert!(matches!(
    strict.from_str::<Node>(r#"{"value":1} trailing"#),
    Err(JsonError::MalformedInput { offset: 12, .. })
  ));

  // Case-insensitivity
  let insensitive = JsonSerializer::new(Options::default().with_case_insensitive(true));
  assert_eq!(insensitive.from_str::<Node>(r#"{"VALUE":2}"#).unwrap().value, 2);
  assert_eq!(lax.from_str::<Node>(r#"{"VALUE":2}"#).unwrap().value, 0);

  // Duplicate members, where the last occurrence wins
  assert_eq!(lax.from_str::<Node>(r#"{"value":1,"value":3}"#).unwrap().value, 3);

  // Non-finite floats
  let Err(JsonError::NonFiniteNumber { path }) = lax.to_string(&vec![1.0, f64::NAN]) else {
    panic!("serialized NaN");
  };
  assert_eq!(path, "$[1]");
}

#[test]
fn shared_across_threads() {
  let serializer = camel();
  std::thread::scope(|scope| {
    let handles = (0 .. 8)
      .map(|_| {
        let serializer = serializer.clone();
        scope.spawn(move || {
          let company = serializer.from_str::<BasicCompany>(BASIC_COMPANY).unwrap();
          verify_company(&company);
          serializer.resolve::<BasicCompany>()
        })
      })
      .collect::<Vec<_>>();
    let descriptors = handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>();
    for descriptor in &descriptors {
      assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
    }
  });
  // `BasicCompany`, `Vec<BasicJsonAddress>`, `BasicJsonAddress`, `String`, `i32`
  assert_eq!(serializer.cache().len(), 5);
}
