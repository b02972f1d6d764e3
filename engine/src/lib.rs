pub mod algo;
pub mod collector;
pub mod driver;
pub mod graph;
pub mod shapes;
pub mod violation;

pub use driver::{ClearanceProvider, ViolationReporter};
pub use violation::CreepageViolation;

use creepage_common::db::core::BoardDB;
use creepage_common::error::BoardError;
use creepage_common::util::config::CreepageConfig;
use std::sync::atomic::AtomicBool;

pub fn check(
    db: &BoardDB,
    config: &CreepageConfig,
    provider: &dyn ClearanceProvider,
    reporter: &dyn ViolationReporter,
    cancel: &AtomicBool,
) -> Result<(), BoardError> {
    driver::run(db, config, provider, reporter, cancel)
}
