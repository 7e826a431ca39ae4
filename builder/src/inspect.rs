use codec::{directory, fat12, parse_boot_sector};
use models::geometry::BOOT_SECTOR_SIZE;
use models::{BootSector, DirEntry, FloppyError, Geometry};

use crate::allocator::follow_chain;

/// 이 크레이트가 만든 이미지의 타입 뷰
#[derive(Debug, Clone)]
pub struct Inspection {
    pub boot: BootSector,
    pub geometry: Geometry,
    pub fat: Vec<u16>,
    pub entries: Vec<DirEntry>,
}

/// `image`의 부트 섹터, FAT, 루트 디렉토리를 디코딩하고
/// 모든 FAT 사본이 동일한지 확인한다.
pub fn inspect_image(image: &[u8]) -> Result<Inspection, FloppyError> {
    if image.len() < BOOT_SECTOR_SIZE {
        return Err(FloppyError::parse(
            "floppy image",
            format!("{} bytes is smaller than a boot sector", image.len()),
        ));
    }

    let boot = parse_boot_sector(&image[..BOOT_SECTOR_SIZE])?;
    if !boot.has_boot_signature() {
        return Err(FloppyError::parse("FAT12 boot sector", "missing 0x55AA signature"));
    }

    let geometry = Geometry::compute(&boot.to_config())?;
    if image.len() < geometry.image_size() {
        return Err(FloppyError::parse(
            "floppy image",
            format!(
                "BPB describes {} bytes but the image has {}",
                geometry.image_size(),
                image.len()
            ),
        ));
    }

    let fat_len = geometry.fat_bytes();
    let primary = &image[geometry.fat_copy_offset(0)..][..fat_len];
    for copy in 1..geometry.fat_copies {
        let mirror = &image[geometry.fat_copy_offset(copy)..][..fat_len];
        if mirror != primary {
            return Err(FloppyError::parse(
                "FAT12 table",
                format!("copy {} differs from copy 0", copy),
            ));
        }
    }
    let fat = fat12::decode_entries(primary, geometry.fat_entry_count())?;

    let root = &image[geometry.root_offset()..][..geometry.root_bytes()];
    let entries = directory::decode_root_directory(root)?;

    Ok(Inspection {
        boot,
        geometry,
        fat,
        entries,
    })
}

impl Inspection {
    /// 점 표기 short name으로 파일 검색 (대소문자 무시)
    pub fn find(&self, name: &str) -> Option<&DirEntry> {
        self.entries
            .iter()
            .find(|e| e.display_name().eq_ignore_ascii_case(name))
    }

    pub fn chain(&self, entry: &DirEntry) -> Result<Vec<u16>, FloppyError> {
        follow_chain(&self.fat, entry.first_cluster())
    }

    /// 체인을 따라가며 파일 내용을 다시 조립한다.
    pub fn read_file(&self, image: &[u8], entry: &DirEntry) -> Result<Vec<u8>, FloppyError> {
        let chain = self.chain(entry)?;
        let cluster_size = self.geometry.cluster_size();
        let size = entry.file_size as usize;

        if chain.len() * cluster_size < size {
            return Err(FloppyError::parse(
                "FAT chain",
                format!(
                    "{} holds {} bytes in {} clusters",
                    entry.display_name(),
                    size,
                    chain.len()
                ),
            ));
        }

        let mut data = Vec::with_capacity(chain.len() * cluster_size);
        for cluster in chain {
            let offset = self.geometry.cluster_offset(cluster);
            data.extend_from_slice(&image[offset..offset + cluster_size]);
        }
        data.truncate(size);
        Ok(data)
    }
}
