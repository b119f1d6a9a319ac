pub mod api;
pub mod format;
pub mod header;
pub mod keys;
pub mod parser;
pub mod scan;
pub mod surgical;

pub use api::{po_entries_to_api_format, PoLanguages};
pub use format::DEFAULT_WRAP_WIDTH;
pub use header::header_from_template;
pub use keys::{
    create_unique_key, parse_unique_key, plural_key, split_plural_suffix, UniqueKey,
    CONTEXT_SEPARATOR, PLURAL_SUFFIX,
};
pub use parser::{parse_po_file, parse_po_file_lenient, PoComments, PoEntry, PoFile};
pub use surgical::{surgical_update_po_file, SurgicalOptions};
