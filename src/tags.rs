//! Tag plumbing: copy one metadata key into another, or re-case a tag
//! value for a particular source's naming convention.
//!
//! Both manglers are one-to-one (reverse is the identity) and recurse, so
//! nested records get the same treatment through sub-pipelines.

use crate::case::{Convention, decode, encode};
use crate::mangler::{FieldValue, Mangler, StageError, expect_one};
use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Copies the value of one tag key into another, verbatim, when the
/// destination key is not already present.
pub struct TagCopyMangler {
    from: String,
    to: String,
}

impl TagCopyMangler {
    pub fn new(from: &str, to: &str) -> Self {
        TagCopyMangler {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl Mangler for TagCopyMangler {
    fn name(&self) -> &'static str {
        "tag-copy"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        let mut out = field.clone();
        if let Some(value) = field.tags.get(&self.from)
            && !field.tags.has(&self.to)
        {
            out.tags.set(&self.to, value);
        }
        Ok(vec![out])
    }

    fn unmangle(
        &self,
        _field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        Ok(expect_one(produced)?.value)
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

/// Rewrites the value under a tag key into a naming convention, falling
/// back to the field's own name when the key is absent.
pub struct TagRecaseMangler {
    key: String,
    convention: Convention,
}

impl TagRecaseMangler {
    pub fn new(key: &str, convention: Convention) -> Self {
        TagRecaseMangler {
            key: key.to_string(),
            convention,
        }
    }
}

impl Mangler for TagRecaseMangler {
    fn name(&self) -> &'static str {
        "tag-recase"
    }

    fn mangle(&self, field: &FieldDescriptor) -> Result<Vec<FieldDescriptor>, StageError> {
        let words = match field.tags.get(&self.key) {
            Some(value) => decode(value)?,
            None => decode(&field.name)?,
        };
        let mut out = field.clone();
        out.tags.set(&self.key, &encode(&words, self.convention));
        Ok(vec![out])
    }

    fn unmangle(
        &self,
        _field: &FieldDescriptor,
        produced: Vec<FieldValue>,
    ) -> Result<Value, StageError> {
        Ok(expect_one(produced)?.value)
    }

    fn recurse(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}
