use anyhow::{bail, Context, Result};
use builder::inputs::{load_inputs, InputManifest};
use builder::{inspect_image, BuildReport, ImageBuilder};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use models::{FloppyConfig, NameMode, VolumeMetadata};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Builds a bootable 1.44 MB FAT12 floppy image")]
struct Args {
    /// Directory holding stage1.bin, stage2.bin and kernel.bin
    build_dir: PathBuf,

    /// Image file name, written as <BUILD_DIR>/<NAME>.img
    #[arg(long, default_value = "nekkoOS")]
    image_name: String,

    /// Volume label (11 characters, space padded)
    #[arg(long)]
    label: Option<String>,

    /// OEM name (8 characters, space padded)
    #[arg(long)]
    oem: Option<String>,

    /// Volume serial number, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_serial)]
    serial: Option<u32>,

    /// Fixed timestamp for every directory entry, "YYYY-MM-DD HH:MM:SS"
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<NaiveDateTime>,

    /// Reject payload names that are not valid 8.3 names instead of truncating them
    #[arg(long)]
    strict_names: bool,

    /// Decode the finished image and check it before reporting success
    #[arg(long)]
    verify: bool,
}

fn parse_serial(s: &str) -> Result<u32, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => s.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let output = args.build_dir.join(format!("{}.img", args.image_name));
    tracing::info!("Building FAT12 disk image: {}", output.display());

    let mut volume = VolumeMetadata::default();
    if let Some(label) = args.label {
        volume.volume_label = label;
    }
    if let Some(oem) = args.oem {
        volume.oem_name = oem;
    }
    if let Some(serial) = args.serial {
        volume.serial = serial;
    }
    let name_mode = if args.strict_names {
        NameMode::Strict
    } else {
        NameMode::Truncate
    };

    let builder = ImageBuilder::new(&FloppyConfig::default(), volume)
        .context("Invalid floppy geometry")?
        .with_name_mode(name_mode);

    // 누락된 payload는 load_inputs가 경고를 남기고 건너뛴다
    let inputs = load_inputs(&InputManifest::for_build_dir(&args.build_dir))
        .context("Failed to read build inputs")?;

    let clock = args.timestamp.unwrap_or_else(|| Local::now().naive_local());
    let image = builder
        .build(&inputs.boot_code, &inputs.payloads, clock)
        .context("Failed to assemble floppy image")?;

    if args.verify {
        let inspection = inspect_image(image.bytes()).context("Built image failed verification")?;
        for file in &image.report().files {
            let Some(entry) = inspection.find(&file.short_name) else {
                bail!("{} is missing from the root directory", file.short_name);
            };
            inspection
                .read_file(image.bytes(), entry)
                .with_context(|| format!("Failed to read back {}", file.short_name))?;
        }
        tracing::info!("  -> Verified {} root entries", inspection.entries.len());
    }

    fs::write(&output, image.bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("FAT12 disk image created: {}", output.display());

    log_layout(image.report());
    Ok(())
}

fn log_layout(report: &BuildReport) {
    let geo = &report.geometry;
    tracing::info!("Filesystem layout:");
    tracing::info!("  Total sectors: {}", geo.total_sectors);
    tracing::info!("  Bytes per sector: {}", geo.bytes_per_sector);
    tracing::info!("  Reserved sectors: {}", geo.reserved_sectors);
    tracing::info!("  FAT copies: {}", geo.fat_copies);
    tracing::info!("  Sectors per FAT: {}", geo.sectors_per_fat);
    tracing::info!("  Root directory entries: {}", geo.root_entries);
    tracing::info!("  FAT start sector: {}", geo.fat_start);
    tracing::info!("  Root start sector: {}", geo.root_start);
    tracing::info!("  Data start sector: {}", geo.data_start);
    tracing::info!(
        "  Clusters: {} used, {} free",
        report.used_clusters,
        report.free_clusters
    );
    for file in &report.files {
        tracing::info!(
            "  {} ({} bytes) at cluster {} (+{})",
            file.short_name,
            file.size,
            file.run.first,
            file.run.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_accepts_hex_and_decimal() {
        assert_eq!(parse_serial("0x12345678"), Ok(0x1234_5678));
        assert_eq!(parse_serial("0XCAFE"), Ok(0xCAFE));
        assert_eq!(parse_serial("42"), Ok(42));
        assert!(parse_serial("0xZZ").is_err());
    }

    #[test]
    fn timestamp_uses_fixed_format() {
        let ts = parse_timestamp("2024-03-15 12:34:56").unwrap();
        assert_eq!(ts.to_string(), "2024-03-15 12:34:56");
        assert!(parse_timestamp("15/03/2024").is_err());
    }

    #[test]
    fn args_parse_positional_build_dir() {
        let args = Args::try_parse_from(["mkfloppy", "build", "--serial", "0x1", "--verify"]).unwrap();
        assert_eq!(args.build_dir, PathBuf::from("build"));
        assert_eq!(args.image_name, "nekkoOS");
        assert_eq!(args.serial, Some(1));
        assert!(args.verify);
        assert!(!args.strict_names);
    }
}
