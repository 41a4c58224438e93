pub mod codec;
pub mod enhancer;
pub mod session_jobs;

pub use codec::{decode_image, encode_png, output_filename, DecodedImage};
pub use enhancer::{clamp_user_settings, EnhanceRequest, EnhanceService, EnhancedImage};
pub use session_jobs::{JobGuard, SessionJobs};
