#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
mod io;
mod stack;
mod string;
mod number;
mod token;
mod tokenizer;
mod writer;

pub use error::JsonError;
#[cfg(feature = "std")]
pub use io::{IoReader, IoWriter};
pub use io::{Read, Write};
pub use number::Number;
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use writer::JsonWriter;

use io::PeekableRead;
use stack::{State, Stack};
use string::{read_string, write_escaped};
use number::read_number;
