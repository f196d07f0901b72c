//! # Deferred Object Handles
//!
//! "Create" calls return an identifier immediately; the native resource is
//! created later, in order, on the consumer thread.
//!
//! ## Lifecycle
//!
//! ```text
//! Producer:  id = reserve()      ──► returned to the script at once
//! Consumer:  handle = factory()  ──► table.insert(id, handle)
//! Consumer:  table.lookup(id)    ──► handle, or NULL if not (yet) present
//! Consumer:  table.remove(id)    ──► no-op if never created
//! ```
//!
//! Identifiers are never reused, so a stale identifier can only ever miss.

mod object_id;
mod table;

pub use object_id::{IdAllocator, NativeHandle, ObjectId};
pub use table::HandleTable;
