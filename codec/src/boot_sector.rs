use binrw::BinReaderExt;
use models::geometry::BOOT_SECTOR_SIZE;
use models::{BootSector, FloppyError, Geometry, VolumeMetadata};
use std::io::Cursor;

use crate::bpb::{BpbLayout, BPB_START, DOS_4_0, SIGNATURE_OFFSET};

/// 부트 코드 최대 길이: 섹터 전체에서 BPB 시작 전 3바이트를 뺀 값
pub const MAX_BOOT_CODE: usize = BOOT_SECTOR_SIZE - BPB_START;

pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// DOS 4.0 BPB 레이아웃으로 첫 섹터를 만든다.
pub fn build_boot_sector(
    boot_code: &[u8],
    geometry: &Geometry,
    volume: &VolumeMetadata,
) -> Result<[u8; BOOT_SECTOR_SIZE], FloppyError> {
    build_boot_sector_with(&DOS_4_0, boot_code, geometry, volume)
}

/// `boot_code`를 오프셋 0에 복사하고 `layout`의 BPB 필드를 덮어쓴 뒤
/// 0x55AA 시그니처를 찍는다. BPB와 시그니처 위치의 부트 코드는 덮어써진다.
pub fn build_boot_sector_with(
    layout: &BpbLayout,
    boot_code: &[u8],
    geometry: &Geometry,
    volume: &VolumeMetadata,
) -> Result<[u8; BOOT_SECTOR_SIZE], FloppyError> {
    if boot_code.len() > MAX_BOOT_CODE {
        return Err(FloppyError::BootCodeTooLarge {
            len: boot_code.len(),
            max: MAX_BOOT_CODE,
        });
    }
    layout.validate()?;

    let mut sector = [0u8; BOOT_SECTOR_SIZE];
    sector[..boot_code.len()].copy_from_slice(boot_code);
    layout.write(&mut sector, geometry, volume);
    sector[SIGNATURE_OFFSET..].copy_from_slice(&BOOT_SIGNATURE);

    tracing::debug!(
        layout = layout.version,
        boot_code = boot_code.len(),
        "boot sector assembled"
    );
    Ok(sector)
}

/// Raw 바이트에서 FAT12 부트 섹터를 파싱한다.
pub fn parse_boot_sector(data: &[u8]) -> Result<BootSector, FloppyError> {
    let mut reader = Cursor::new(data);

    let boot_sector: BootSector = reader.read_le().map_err(|e| FloppyError::ParseError {
        structure: "FAT12 boot sector".to_string(),
        details: e.to_string(),
    })?;

    Ok(boot_sector)
}
