//! BIOS Parameter Block용 버전별 바이트 오프셋 테이블
//!
//! 부트 섹터 작성기는 모든 필드를 [`BpbLayout`]을 통해 배치한다.
//! 다른 BPB 버전은 테이블만 새로 만들면 된다.

use models::{FloppyError, Geometry, VolumeMetadata};

/// BPB 첫 바이트 위치 (3바이트 jump 바로 뒤)
pub const BPB_START: usize = 3;
/// 0x55AA 부트 시그니처 위치
pub const SIGNATURE_OFFSET: usize = 510;
pub const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpbField {
    OemName,
    BytesPerSector,
    SectorsPerCluster,
    ReservedSectors,
    FatCopies,
    RootEntries,
    TotalSectors16,
    MediaDescriptor,
    SectorsPerFat,
    SectorsPerTrack,
    Heads,
    HiddenSectors,
    TotalSectors32,
    DriveNumber,
    Reserved,
    ExtendedBootSignature,
    VolumeSerial,
    VolumeLabel,
    FsType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub field: BpbField,
    pub offset: usize,
    pub width: usize,
}

const fn slot(field: BpbField, offset: usize, width: usize) -> FieldSlot {
    FieldSlot { field, offset, width }
}

#[derive(Debug, Clone, Copy)]
pub struct BpbLayout {
    pub version: &'static str,
    pub slots: &'static [FieldSlot],
}

/// DOS 4.0 BPB + 확장 부트 레코드 (플로피 표준)
pub const DOS_4_0: BpbLayout = BpbLayout {
    version: "DOS 4.0 EBPB",
    slots: &[
        slot(BpbField::OemName, 0x03, 8),
        slot(BpbField::BytesPerSector, 0x0B, 2),
        slot(BpbField::SectorsPerCluster, 0x0D, 1),
        slot(BpbField::ReservedSectors, 0x0E, 2),
        slot(BpbField::FatCopies, 0x10, 1),
        slot(BpbField::RootEntries, 0x11, 2),
        slot(BpbField::TotalSectors16, 0x13, 2),
        slot(BpbField::MediaDescriptor, 0x15, 1),
        slot(BpbField::SectorsPerFat, 0x16, 2),
        slot(BpbField::SectorsPerTrack, 0x18, 2),
        slot(BpbField::Heads, 0x1A, 2),
        slot(BpbField::HiddenSectors, 0x1C, 4),
        slot(BpbField::TotalSectors32, 0x20, 4),
        slot(BpbField::DriveNumber, 0x24, 1),
        slot(BpbField::Reserved, 0x25, 1),
        slot(BpbField::ExtendedBootSignature, 0x26, 1),
        slot(BpbField::VolumeSerial, 0x27, 4),
        slot(BpbField::VolumeLabel, 0x2B, 11),
        slot(BpbField::FsType, 0x36, 8),
    ],
};

impl BpbLayout {
    /// 슬롯은 순서대로, 겹치지 않게, jump와 시그니처 사이에 있어야 한다.
    pub fn validate(&self) -> Result<(), FloppyError> {
        let mut cursor = BPB_START;
        for s in self.slots {
            if s.offset < cursor {
                return Err(FloppyError::config(format!(
                    "{}: {:?} at {:#x} overlaps the previous field",
                    self.version, s.field, s.offset
                )));
            }
            if !matches!(s.field, BpbField::OemName | BpbField::VolumeLabel | BpbField::FsType)
                && ![1, 2, 4].contains(&s.width)
            {
                return Err(FloppyError::config(format!(
                    "{}: {:?} has unsupported width {}",
                    self.version, s.field, s.width
                )));
            }
            cursor = s.offset + s.width;
        }
        if cursor > SIGNATURE_OFFSET {
            return Err(FloppyError::config(format!(
                "{}: fields run into the boot signature",
                self.version
            )));
        }
        Ok(())
    }

    /// 레이아웃의 모든 필드를 `sector`에 기록한다.
    pub fn write(&self, sector: &mut [u8], geometry: &Geometry, volume: &VolumeMetadata) {
        for s in self.slots {
            let dst = &mut sector[s.offset..s.offset + s.width];
            match field_value(s.field, geometry, volume) {
                FieldValue::Int(v) => dst.copy_from_slice(&v.to_le_bytes()[..s.width]),
                FieldValue::Text(text) => write_padded(dst, text),
            }
        }
    }
}

enum FieldValue<'a> {
    Int(u32),
    Text(&'a str),
}

fn field_value<'a>(field: BpbField, geo: &Geometry, volume: &'a VolumeMetadata) -> FieldValue<'a> {
    use FieldValue::{Int, Text};

    match field {
        BpbField::OemName => Text(&volume.oem_name),
        BpbField::BytesPerSector => Int(geo.bytes_per_sector as u32),
        BpbField::SectorsPerCluster => Int(geo.sectors_per_cluster as u32),
        BpbField::ReservedSectors => Int(geo.reserved_sectors as u32),
        BpbField::FatCopies => Int(geo.fat_copies as u32),
        BpbField::RootEntries => Int(geo.root_entries as u32),
        BpbField::TotalSectors16 => Int(geo.total_sectors_16() as u32),
        BpbField::MediaDescriptor => Int(geo.media_descriptor as u32),
        BpbField::SectorsPerFat => Int(geo.sectors_per_fat as u32),
        BpbField::SectorsPerTrack => Int(geo.sectors_per_track as u32),
        BpbField::Heads => Int(geo.heads as u32),
        BpbField::HiddenSectors => Int(geo.hidden_sectors),
        BpbField::TotalSectors32 => Int(geo.total_sectors_32()),
        BpbField::DriveNumber => Int(0),
        BpbField::Reserved => Int(0),
        BpbField::ExtendedBootSignature => Int(EXTENDED_BOOT_SIGNATURE as u32),
        BpbField::VolumeSerial => Int(volume.serial),
        BpbField::VolumeLabel => Text(&volume.volume_label),
        BpbField::FsType => Text(&volume.fs_type),
    }
}

/// `text`를 `dst`에 복사한다. 길면 자르고 짧으면 공백으로 채운다.
fn write_padded(dst: &mut [u8], text: &str) {
    dst.fill(b' ');
    let bytes = text.as_bytes();
    let len = bytes.len().min(dst.len());
    dst[..len].copy_from_slice(&bytes[..len]);
}
