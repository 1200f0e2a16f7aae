//! The representative benchmark payload and the type-directed rules used to
//! populate it.

use serde::{Deserialize, Serialize};

use crate::{BenchError, Result, SUCCESS_MARKER};

/// Value given to every boolean field.
pub const FILL_BOOL: bool = true;
/// Value given to every 32- and 64-bit integer field.
pub const FILL_INT: i64 = 100_000;
/// Value given to every string field. Deliberately multi-byte.
pub const FILL_STRING: &str = "许多往事在眼前一幕一幕，变的那麼模糊";

/// A field type with a fixed population rule.
pub trait Fill {
    /// Overwrite `self` with the rule's value for this type.
    fn fill(&mut self);
}

impl Fill for bool {
    fn fill(&mut self) {
        *self = FILL_BOOL;
    }
}

impl Fill for i32 {
    fn fill(&mut self) {
        *self = FILL_INT as i32;
    }
}

impl Fill for i64 {
    fn fill(&mut self) {
        *self = FILL_INT;
    }
}

impl Fill for String {
    fn fill(&mut self) {
        *self = FILL_STRING.to_string();
    }
}

/// Optional fields are made present, then filled by the inner type's rule.
impl<T: Fill + Default> Fill for Option<T> {
    fn fill(&mut self) {
        self.get_or_insert_with(T::default).fill();
    }
}

/// A request schema that knows how to populate itself with representative values.
pub trait PopulateDefaults: Default {
    /// Fill every supported field. Fields of unsupported kinds are left untouched.
    fn populate_defaults(&mut self);

    /// A freshly populated instance.
    fn populated() -> Self {
        let mut value = Self::default();
        value.populate_defaults();
        value
    }
}

macro_rules! fill_fields {
    ($msg:ident: $($field:ident),+ $(,)?) => {
        $( $msg.$field.fill(); )+
    };
}

/// Benchmark request/reply payload.
///
/// Mixes value-typed and optional fields of every supported kind; `field5` is a
/// repeated field, which has no population rule and stays empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkMessage {
    pub field1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field9: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field18: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field80: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field81: Option<bool>,
    pub field2: i32,
    pub field3: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field280: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field6: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field22: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field4: Option<String>,
    pub field5: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field59: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field7: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field16: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field130: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field12: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field17: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field13: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field14: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field104: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field100: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field101: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field102: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field103: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field29: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field30: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field60: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field271: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field272: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field150: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field23: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field24: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field25: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field78: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field67: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field68: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field128: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field129: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field131: Option<i32>,
}

impl PopulateDefaults for BenchmarkMessage {
    fn populate_defaults(&mut self) {
        let msg = self;
        fill_fields!(msg:
            field1, field9, field18, field80, field81, field2, field3, field280,
            field6, field22, field4, field59, field7, field16, field130, field12,
            field17, field13, field14, field104, field100, field101, field102,
            field103, field29, field30, field60, field271, field272, field150,
            field23, field24, field25, field78, field67, field68, field128,
            field129, field131,
        );
    }
}

impl BenchmarkMessage {
    /// Size in bytes of this message in its wire encoding (JSON).
    pub fn encoded_len(&self) -> Result<usize> {
        serde_json::to_vec(self)
            .map(|bytes| bytes.len())
            .map_err(|e| BenchError::Encoding(e.to_string()))
    }

    /// `true` if the responder marked this reply as handled correctly.
    pub fn has_success_marker(&self) -> bool {
        self.field1 == SUCCESS_MARKER
    }
}
