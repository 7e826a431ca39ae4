use crate::config::FloppyConfig;
use crate::error::FloppyError;
use crate::fat::{FAT12_MAX_CLUSTERS, FIRST_DATA_CLUSTER, LAST_DATA_CLUSTER};

/// 루트 디렉토리 레코드 하나의 크기
pub const DIR_ENTRY_SIZE: u32 = 32;

/// 부트 섹터 크기 (섹터 크기와 무관)
pub const BOOT_SECTOR_SIZE: usize = 512;

/// [`FloppyConfig`]에서 한 번 계산되는 파일시스템 배치.
/// `*_start` 필드는 모두 섹터 번호이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
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
    pub total_sectors: u32,
    pub fat_start: u32,
    pub root_start: u32,
    pub root_sectors: u32,
    pub data_start: u32,
}

impl Geometry {
    pub fn compute(config: &FloppyConfig) -> Result<Self, FloppyError> {
        if config.bytes_per_sector == 0 {
            return Err(FloppyError::config("bytes per sector is zero"));
        }
        if config.sectors_per_cluster == 0 {
            return Err(FloppyError::config("sectors per cluster is zero"));
        }
        if config.root_entries == 0 {
            return Err(FloppyError::config("root entry capacity is zero"));
        }
        if config.fat_copies == 0 {
            return Err(FloppyError::config("at least one FAT copy is required"));
        }
        if config.sectors_per_fat == 0 {
            return Err(FloppyError::config("sectors per FAT is zero"));
        }

        let bps = config.bytes_per_sector as u32;
        if config.image_size % bps != 0 {
            return Err(FloppyError::config(format!(
                "image size {} is not a multiple of the {} byte sector",
                config.image_size, bps
            )));
        }
        if (config.reserved_sectors as usize) * (bps as usize) < BOOT_SECTOR_SIZE {
            return Err(FloppyError::config(
                "reserved sectors cannot hold the 512 byte boot sector",
            ));
        }

        let total_sectors = config.image_size / bps;
        let fat_start = config.reserved_sectors as u32;
        let root_start = fat_start + config.fat_copies as u32 * config.sectors_per_fat as u32;
        let root_sectors = (config.root_entries as u32 * DIR_ENTRY_SIZE).div_ceil(bps);
        let data_start = root_start + root_sectors;

        if data_start > total_sectors {
            return Err(FloppyError::config(format!(
                "data region starts at sector {} but the image only has {}",
                data_start, total_sectors
            )));
        }

        // 클러스터 수가 FAT 타입을 결정하므로 FAT12 범위를 넘으면 안 된다
        let data_clusters = (total_sectors - data_start) / config.sectors_per_cluster as u32;
        if data_clusters > FAT12_MAX_CLUSTERS {
            return Err(FloppyError::config(format!(
                "{} data clusters exceed the FAT12 limit of {}",
                data_clusters, FAT12_MAX_CLUSTERS
            )));
        }
        let fat_capacity = config.sectors_per_fat as usize * bps as usize * 2 / 3;
        if fat_capacity < data_clusters as usize + FIRST_DATA_CLUSTER as usize {
            return Err(FloppyError::config(format!(
                "{} sectors per FAT hold {} entries, {} data clusters need {}",
                config.sectors_per_fat,
                fat_capacity,
                data_clusters,
                data_clusters as usize + FIRST_DATA_CLUSTER as usize
            )));
        }

        Ok(Self {
            bytes_per_sector: config.bytes_per_sector,
            sectors_per_cluster: config.sectors_per_cluster,
            reserved_sectors: config.reserved_sectors,
            fat_copies: config.fat_copies,
            root_entries: config.root_entries,
            sectors_per_fat: config.sectors_per_fat,
            sectors_per_track: config.sectors_per_track,
            heads: config.heads,
            media_descriptor: config.media_descriptor,
            hidden_sectors: config.hidden_sectors,
            total_sectors,
            fat_start,
            root_start,
            root_sectors,
            data_start,
        })
    }

    pub fn image_size(&self) -> usize {
        self.total_sectors as usize * self.bytes_per_sector as usize
    }

    pub fn sector_offset(&self, sector: u32) -> usize {
        sector as usize * self.bytes_per_sector as usize
    }

    /// 클러스터 크기 (바이트)
    pub fn cluster_size(&self) -> usize {
        self.sectors_per_cluster as usize * self.bytes_per_sector as usize
    }

    /// FAT 사본 하나의 바이트 수
    pub fn fat_bytes(&self) -> usize {
        self.sectors_per_fat as usize * self.bytes_per_sector as usize
    }

    /// FAT 사본 하나에 들어가는 12비트 엔트리 개수
    pub fn fat_entry_capacity(&self) -> usize {
        self.fat_bytes() * 2 / 3
    }

    pub fn data_clusters(&self) -> u32 {
        (self.total_sectors - self.data_start) / self.sectors_per_cluster as u32
    }

    /// 이미지 공간과 FAT 슬롯이 모두 있는 데이터 클러스터 수
    pub fn max_clusters(&self) -> u32 {
        let fat_slots = self.fat_entry_capacity().saturating_sub(FIRST_DATA_CLUSTER as usize) as u32;
        let legal = (LAST_DATA_CLUSTER - FIRST_DATA_CLUSTER + 1) as u32;
        self.data_clusters().min(fat_slots).min(legal)
    }

    /// FAT 엔트리 arena 길이: 예약 슬롯 2개 + 사용 가능한 클러스터 전부
    pub fn fat_entry_count(&self) -> usize {
        FIRST_DATA_CLUSTER as usize + self.max_clusters() as usize
    }

    pub fn fat_copy_offset(&self, copy: u8) -> usize {
        self.sector_offset(self.fat_start + copy as u32 * self.sectors_per_fat as u32)
    }

    pub fn root_offset(&self) -> usize {
        self.sector_offset(self.root_start)
    }

    pub fn root_bytes(&self) -> usize {
        self.sector_offset(self.root_sectors)
    }

    pub fn data_offset(&self) -> usize {
        self.sector_offset(self.data_start)
    }

    /// 데이터 클러스터의 바이트 오프셋. 클러스터 번호는 2부터 시작한다.
    pub fn cluster_offset(&self, cluster: u16) -> usize {
        let index = (cluster - FIRST_DATA_CLUSTER) as u32;
        self.sector_offset(self.data_start + index * self.sectors_per_cluster as u32)
    }

    /// 16비트 총 섹터 필드 값. 32비트 필드를 쓰는 경우 0
    pub fn total_sectors_16(&self) -> u16 {
        if self.total_sectors < 0x1_0000 {
            self.total_sectors as u16
        } else {
            0
        }
    }

    pub fn total_sectors_32(&self) -> u32 {
        if self.total_sectors < 0x1_0000 {
            0
        } else {
            self.total_sectors
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_floppy_layout() {
        let geo = Geometry::compute(&FloppyConfig::default()).unwrap();
        assert_eq!(geo.total_sectors, 2880);
        assert_eq!(geo.fat_start, 1);
        assert_eq!(geo.root_start, 19);
        assert_eq!(geo.root_sectors, 14);
        assert_eq!(geo.data_start, 33);
        assert_eq!(geo.data_clusters(), 2847);
        assert_eq!(geo.max_clusters(), 2847);
        assert_eq!(geo.fat_entry_count(), 2849);
        assert_eq!(geo.cluster_offset(2), 33 * 512);
        assert_eq!(geo.fat_copy_offset(1), 10 * 512);
        assert_eq!(geo.total_sectors_16(), 2880);
        assert_eq!(geo.total_sectors_32(), 0);
    }

    #[test]
    fn data_region_fits_inside_image() {
        let configs = [
            FloppyConfig::default(),
            FloppyConfig {
                image_size: 737_280,
                root_entries: 112,
                sectors_per_cluster: 2,
                sectors_per_fat: 3,
                sectors_per_track: 9,
                media_descriptor: 0xF9,
                ..FloppyConfig::default()
            },
            FloppyConfig {
                image_size: 64 * 1024,
                sectors_per_fat: 1,
                root_entries: 16,
                ..FloppyConfig::default()
            },
            FloppyConfig {
                image_size: 40 * 1024 * 1024,
                sectors_per_cluster: 32,
                sectors_per_fat: 8,
                ..FloppyConfig::default()
            },
        ];

        for config in configs {
            let geo = Geometry::compute(&config).unwrap();
            let used = geo.data_offset() + geo.max_clusters() as usize * geo.cluster_size();
            assert!(used <= config.image_size as usize, "{:?}", config);
            assert!(geo.fat_entry_count() <= geo.fat_entry_capacity());
            assert_eq!(geo.max_clusters(), geo.data_clusters());
        }
    }

    #[test]
    fn large_images_use_the_32_bit_sector_count() {
        let geo = Geometry::compute(&FloppyConfig {
            image_size: 40 * 1024 * 1024,
            sectors_per_cluster: 32,
            sectors_per_fat: 8,
            ..FloppyConfig::default()
        })
        .unwrap();
        assert_eq!(geo.total_sectors_16(), 0);
        assert_eq!(geo.total_sectors_32(), 81_920);
        assert_eq!(geo.data_clusters(), 2559);
    }

    #[test]
    fn cluster_count_stays_in_fat12_range() {
        // data_start = 1 + 2 * 12 + 14 = 39
        let at_limit = FloppyConfig {
            image_size: (39 + 4084) * 512,
            sectors_per_fat: 12,
            ..FloppyConfig::default()
        };
        let geo = Geometry::compute(&at_limit).unwrap();
        assert_eq!(geo.data_clusters(), FAT12_MAX_CLUSTERS);
        assert_eq!(geo.max_clusters(), FAT12_MAX_CLUSTERS);
        assert_eq!(geo.fat_entry_count() - 1, LAST_DATA_CLUSTER as usize);

        let over_limit = FloppyConfig {
            image_size: (39 + 4085) * 512,
            ..at_limit
        };
        assert!(matches!(Geometry::compute(&over_limit), Err(FloppyError::Config { .. })));

        let fat16_sized = FloppyConfig {
            image_size: 40 * 1024 * 1024,
            sectors_per_cluster: 8,
            sectors_per_fat: 12,
            ..FloppyConfig::default()
        };
        assert!(matches!(Geometry::compute(&fat16_sized), Err(FloppyError::Config { .. })));
    }

    #[test]
    fn fat_must_cover_every_data_cluster() {
        // 섹터 1개짜리 FAT는 341 엔트리뿐인데 클러스터는 2863개
        let config = FloppyConfig {
            sectors_per_fat: 1,
            ..FloppyConfig::default()
        };
        assert!(matches!(Geometry::compute(&config), Err(FloppyError::Config { .. })));
    }

    #[test]
    fn rejects_invalid_configuration() {
        let bad = [
            FloppyConfig { bytes_per_sector: 0, ..FloppyConfig::default() },
            FloppyConfig { root_entries: 0, ..FloppyConfig::default() },
            FloppyConfig { sectors_per_cluster: 0, ..FloppyConfig::default() },
            FloppyConfig { fat_copies: 0, ..FloppyConfig::default() },
            FloppyConfig { sectors_per_fat: 0, ..FloppyConfig::default() },
            FloppyConfig { image_size: 1000, ..FloppyConfig::default() },
            FloppyConfig { image_size: 16 * 512, ..FloppyConfig::default() },
            FloppyConfig { reserved_sectors: 0, ..FloppyConfig::default() },
        ];

        for config in bad {
            assert!(
                matches!(Geometry::compute(&config), Err(FloppyError::Config { .. })),
                "{:?} should be rejected",
                config
            );
        }
    }
}
