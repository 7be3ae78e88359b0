#[cfg(test)]
pub mod test {
    use crate::schema::{FieldDescriptor, RecordSchema, TypeDescriptor};

    /// The canonical two-level shape used across tests:
    /// `{ name: string, address: option<{ street: string, zip: string }> }`.
    pub fn address_book_schema() -> RecordSchema {
        let address = RecordSchema::new(vec![
            FieldDescriptor::new("street", TypeDescriptor::Str),
            FieldDescriptor::new("zip", TypeDescriptor::Str),
        ]);
        RecordSchema::new(vec![
            FieldDescriptor::new("name", TypeDescriptor::Str),
            FieldDescriptor::new(
                "address",
                TypeDescriptor::optional(TypeDescriptor::Record(address)),
            ),
        ])
    }

    /// The same shape after pointer-normalization: every leaf optional,
    /// the nested block still behind a single pointer.
    pub fn normalized_address_book() -> RecordSchema {
        let address = RecordSchema::new(vec![
            FieldDescriptor::new("street", TypeDescriptor::optional(TypeDescriptor::Str)),
            FieldDescriptor::new("zip", TypeDescriptor::optional(TypeDescriptor::Str)),
        ]);
        RecordSchema::new(vec![
            FieldDescriptor::new("name", TypeDescriptor::optional(TypeDescriptor::Str)),
            FieldDescriptor::new(
                "address",
                TypeDescriptor::optional(TypeDescriptor::Record(address)),
            ),
        ])
    }

    #[test]
    fn normalizing_the_fixture_matches_the_normalized_fixture() {
        let normalized = crate::normalize(&address_book_schema(), None).unwrap();
        assert_eq!(normalized, normalized_address_book());
    }
}
