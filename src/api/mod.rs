pub mod enhance;
pub mod presets;

pub use enhance::{handle_enhance, EnhanceQuery, SESSION_HEADER, __path_handle_enhance};
pub use presets::{
    handle_presets, PresetsResponse, RangeBody, SettingsBody, __path_handle_presets,
};
