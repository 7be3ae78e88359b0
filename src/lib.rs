//! Bidirectional schema reshaping for layered configuration sources.
//! Declare a record shape, pick your manglers, and go.
//!
//! Remold solves the part of configuration loading that is genuinely hard:
//! a source (a file format, environment variables, command-line flags)
//! rarely wants your record shape as-is. It wants flattened field names,
//! its own key convention, string-only leaves, or a simpler type in place
//! of a rich one. Remold reshapes a schema for the source, lets the source
//! fill in the reshaped value, and then deterministically reconstructs a
//! value of the *original* shape — generically, for any record shape,
//! without per-type glue.
//!
//! ```ignore
//! let schema = remold::normalize(&raw_schema, None)?;
//! let mut tr = Translator::new(schema, vec![
//!     Arc::new(HoistMangler::new()),
//!     Arc::new(FlattenMangler::new("name", Convention::Snake)),
//!     Arc::new(TextMangler::new()),
//! ]);
//! tr.translate()?;
//! let filled = remold::fill_from_env(tr.reshaped().unwrap(), "MYAPP", std::env::vars(), "name")?;
//! let value = tr.reverse(filled)?;
//! ```
//!
//! # The pipeline
//!
//! ```text
//! caller schema
//!      │  normalize()          every field's absence distinguishable
//!      ▼                       from its zero value
//! nilable schema
//!      │  Translator::translate()   manglers applied in order
//!      ▼
//! reshaped schema + zero value ──→ source adapter fills leaves
//!      │  Translator::reverse()     manglers replayed backwards
//!      ▼
//! value of the original schema
//! ```
//!
//! Because Rust has no runtime reflection, the shape is explicit data: a
//! [`RecordSchema`] of [`FieldDescriptor`]s, and values travel as a
//! dynamic [`Value`] tree mirroring it. Record values are positional —
//! field order in the schema is load-bearing everywhere.
//!
//! # Manglers
//!
//! A [`Mangler`] maps one input field to zero-or-more output fields and
//! knows how to invert itself. The engine keeps the bookkeeping that makes
//! arbitrary one-to-many rewrites invertible; a mangler only promises that
//! `unmangle` accepts exactly the fields `mangle` produced, in order.
//! Seven strategies ship in the crate:
//!
//! - [`FlattenMangler`] — nested records become one field per leaf
//!   (`database.url` → `DatabaseUrl`, tagged `database_url`).
//! - [`HoistMangler`] — embedded records hoist their fields into the
//!   parent, transitively.
//! - [`TagCopyMangler`] / [`TagRecaseMangler`] — copy a metadata key or
//!   rewrite one into a source's naming convention.
//! - [`AliasMangler`] — accept two spellings for one field, rejecting
//!   input that sets both.
//! - [`SubstituteMangler`] — swap one type for another anywhere in a
//!   field's type structure (a `Duration` leaf as integer nanoseconds),
//!   wrappers preserved.
//! - [`SetMangler`] — sets (maps to unit) as sequences of keys,
//!   deduplicated on the way back.
//! - [`TextMangler`] — opaque-text types as optional strings, for sources
//!   that can only supply text.
//!
//! Manglers that leave a field's structure alone declare recursion, and
//! the engine re-derives each nested record's schema per stage through a
//! private sub-pipeline, so one stage's renames are visible to the next.
//!
//! # Normalization
//!
//! [`normalize`] preprocesses a schema so that "absent" and "zero" are
//! different things: plain leaves gain one optional layer, maps and
//! sequences stay bare (already nilable), channels are dropped, fields
//! tagged `omit` disappear, and opaque-text types are wrapped whole.
//! Dynamically-typed fields specialize to the shape of a supplied
//! template value when one is present.
//!
//! # Filling values
//!
//! The [`fill_from_env`], [`fill_from_toml`], and [`fill_from_json`]
//! adapters consume only the public surface — reshaped schema in, filled
//! [`Value`] out — and [`into_typed`] deserializes a reconstructed value
//! into your own struct via serde. Parsing wire formats, source
//! precedence, and validation stay with the caller.
//!
//! # Reuse and concurrency
//!
//! `translate` and `reverse` are plain synchronous calls; recursion depth
//! is bounded by the caller's record shape. A [`Translator`] retains the
//! stage state of its last `translate` precisely so `reverse` can invert
//! it: run one `reverse` per `translate`, and don't share a translator
//! across threads. Schemas and manglers are immutable and safe to share
//! between concurrently-built translators.
//!
//! # Error handling
//!
//! All fallible operations return [`RemoldError`]. Errors carry their
//! position: a failing stage reports its index, mangler name, and field;
//! nested failures chain the field names they crossed; reassembly
//! failures name both the declared and the produced type. The one
//! invariant violation that panics instead is a produced-value count
//! mismatch, which indicates a broken mangler rather than bad data.

pub mod case;
pub mod error;

mod alias;
mod env;
mod fill;
mod flatten;
mod hoist;
mod mangler;
mod normalize;
mod schema;
mod set;
mod substitute;
mod tags;
mod text;
mod translate;
mod value;

#[cfg(test)]
mod fixtures;

pub use alias::AliasMangler;
pub use case::{CaseError, Convention};
pub use env::fill_from_env;
pub use error::RemoldError;
pub use fill::{fill_from_json, fill_from_toml, into_typed, to_json};
pub use flatten::FlattenMangler;
pub use hoist::HoistMangler;
pub use mangler::{FieldValue, Mangler, StageError};
pub use normalize::{OMIT, normalize};
pub use schema::{FieldDescriptor, OpaqueType, RecordSchema, Tags, TypeDescriptor};
pub use set::SetMangler;
pub use substitute::SubstituteMangler;
pub use tags::{TagCopyMangler, TagRecaseMangler};
pub use text::TextMangler;
pub use translate::Translator;
pub use value::{ChannelValue, ConvertError, Value};
