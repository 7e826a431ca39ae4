use binrw::BinRead;

use crate::config::FloppyConfig;

/// 디스크 상의 FAT12 부트 섹터 (512바이트)
/// 읽기 전용. 쓰기는 BPB 오프셋 테이블을 거친다.
#[derive(BinRead, Debug, Clone)]
#[br(little)]
pub struct BootSector {
    pub jump: [u8; 3],
    pub oem_name: [u8; 8],

    // 0x0B: BIOS Parameter Block
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_copies: u8,
    pub root_entries: u16,
    pub total_sectors_16: u16,
    pub media_descriptor: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,

    // 0x24: extended BPB
    pub drive_number: u8,
    pub reserved: u8,
    pub boot_signature: u8,
    pub volume_serial: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],

    #[br(pad_before = 448)] // 0x1FE까지 부트 코드
    pub signature: [u8; 2],
}

impl BootSector {
    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }

    pub fn has_boot_signature(&self) -> bool {
        self.signature == [0x55, 0xAA]
    }

    pub fn oem(&self) -> String {
        String::from_utf8_lossy(&self.oem_name).to_string()
    }

    pub fn label(&self) -> String {
        String::from_utf8_lossy(&self.volume_label).to_string()
    }

    /// 이 BPB를 만들어 내는 설정을 역으로 구성한다.
    pub fn to_config(&self) -> FloppyConfig {
        FloppyConfig {
            image_size: self.total_sectors().saturating_mul(self.bytes_per_sector as u32),
            bytes_per_sector: self.bytes_per_sector,
            sectors_per_cluster: self.sectors_per_cluster,
            reserved_sectors: self.reserved_sectors,
            fat_copies: self.fat_copies,
            root_entries: self.root_entries,
            sectors_per_fat: self.sectors_per_fat,
            sectors_per_track: self.sectors_per_track,
            heads: self.heads,
            media_descriptor: self.media_descriptor,
            hidden_sectors: self.hidden_sectors,
        }
    }
}
