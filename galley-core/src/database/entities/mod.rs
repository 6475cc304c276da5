pub mod assets;
pub mod content_type_fields;
pub mod content_types;
pub mod data_templates;
pub mod engines;
pub mod field_types;
pub mod flow_states;
pub mod flows;
pub mod frames;
pub mod layouts;
pub mod organisations;
pub mod themes;
pub mod users;
