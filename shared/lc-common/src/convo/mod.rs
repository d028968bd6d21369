//! Conversation, preset and option schemas.

pub mod coerce;
pub mod parse;
pub mod records;
pub mod schema;
pub mod sender;

pub use parse::{
    parse_compact_convo, parse_convo, remove_nullish_values, EndpointSchema, PossibleValues,
};
pub use records::{Banner, ConversationTag, SharedLink};
pub use schema::{
    AgentOptions, Conversation, ConversationFields, Example, ExampleContent, Plugin,
    PluginAuthConfig, Preset, Tool, DEFAULT_TITLE, MAX_PRESET_TITLE,
};
pub use sender::{response_sender, EndpointOption};
