pub mod config;
pub mod ocr_result;
pub mod roi;
