pub mod fat12;
pub mod bpb;
pub mod boot_sector;
pub mod directory;

pub use boot_sector::{build_boot_sector, parse_boot_sector, MAX_BOOT_CODE};
