/// 플로피 이미지 geometry 설정값. 기본값은 1.44 MB 3.5" 디스크
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloppyConfig {
    pub image_size: u32,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_copies: u8,
    pub root_entries: u16,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub heads: u16,
    pub media_descriptor: u8,
    pub hidden_sectors: u32,
}

impl Default for FloppyConfig {
    fn default() -> Self {
        Self {
            image_size: 1_474_560,
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_copies: 2,
            root_entries: 224,
            sectors_per_fat: 9,
            sectors_per_track: 18,
            heads: 2,
            media_descriptor: 0xF0,
            hidden_sectors: 0,
        }
    }
}

/// 확장 BPB에 기록되는 식별 문자열과 시리얼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMetadata {
    pub oem_name: String,
    pub volume_label: String,
    pub fs_type: String,
    pub serial: u32,
}

impl Default for VolumeMetadata {
    fn default() -> Self {
        Self {
            oem_name: "NEKKOOS ".to_string(),
            volume_label: "nekkoOS    ".to_string(),
            fs_type: "FAT12   ".to_string(),
            serial: 0x1234_5678,
        }
    }
}

/// 8.3에 맞지 않는 payload 이름 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    /// 이름은 8자, 확장자는 3자로 자른다.
    #[default]
    Truncate,
    /// 잘라야 하는 이름은 거부한다.
    Strict,
}
