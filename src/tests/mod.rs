mod integration_tests;
pub mod test_utils;
mod wallet_tests;
