use chrono::NaiveDateTime;
use codec::{build_boot_sector, directory, fat12};
use models::{DirEntry, FatTimestamp, FloppyConfig, FloppyError, Geometry, NameMode, VolumeMetadata};

use crate::allocator::{ClusterAllocator, ClusterRun};

/// 루트 디렉토리에 넣을 파일 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub name: String,
    pub data: Vec<u8>,
}

impl Payload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub short_name: String,
    pub size: usize,
    pub run: ClusterRun,
}

/// 빌드 결과 배치 정보 (호출자가 출력용으로 사용)
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub geometry: Geometry,
    pub boot_code_len: usize,
    pub files: Vec<FileReport>,
    pub used_clusters: u32,
    pub free_clusters: u32,
}

/// 완성된 이미지 버퍼와 빌드 리포트
#[derive(Debug, Clone)]
pub struct FloppyImage {
    bytes: Vec<u8>,
    report: BuildReport,
}

impl FloppyImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 빌드 1회분의 가변 상태. [`ImageBuilder::build`] 안에서만 존재한다.
struct BuildState {
    image: Vec<u8>,
    allocator: ClusterAllocator,
    records: Vec<DirEntry>,
}

impl BuildState {
    fn new(geometry: &Geometry) -> Self {
        Self {
            image: vec![0u8; geometry.image_size()],
            allocator: ClusterAllocator::new(geometry),
            records: Vec::with_capacity(geometry.root_entries as usize),
        }
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) {
        self.image[offset..offset + data.len()].copy_from_slice(data);
    }

    fn add_file(
        &mut self,
        geometry: &Geometry,
        payload: &Payload,
        stamp: FatTimestamp,
        mode: NameMode,
    ) -> Result<FileReport, FloppyError> {
        if self.records.len() >= geometry.root_entries as usize {
            return Err(FloppyError::RootDirectoryFull {
                capacity: geometry.root_entries,
            });
        }

        let mut entry = directory::file_entry(&payload.name, payload.data.len(), 0, stamp, mode)?;
        if let Some(existing) = self.records.iter().find(|r| r.name == entry.name) {
            return Err(FloppyError::InvalidName {
                name: payload.name.clone(),
                reason: format!("short name collides with {}", existing.display_name()),
            });
        }

        let run = self.allocator.allocate(payload.data.len())?;
        entry.first_cluster_low = run.first;

        // 마지막 클러스터의 남는 부분은 0으로 유지
        for (cluster, chunk) in run.clusters().zip(payload.data.chunks(geometry.cluster_size())) {
            self.write_at(geometry.cluster_offset(cluster), chunk);
        }

        let report = FileReport {
            name: payload.name.clone(),
            short_name: entry.display_name(),
            size: payload.data.len(),
            run,
        };
        self.records.push(entry);
        Ok(report)
    }
}

/// 하나의 geometry로 완전한 FAT12 이미지를 조립한다.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    geometry: Geometry,
    volume: VolumeMetadata,
    name_mode: NameMode,
}

impl ImageBuilder {
    pub fn new(config: &FloppyConfig, volume: VolumeMetadata) -> Result<Self, FloppyError> {
        Ok(Self {
            geometry: Geometry::compute(config)?,
            volume,
            name_mode: NameMode::default(),
        })
    }

    pub fn with_name_mode(mut self, mode: NameMode) -> Self {
        self.name_mode = mode;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// 이미지를 만든다. 모든 디렉토리 레코드에 `clock`이 찍히므로
    /// 입력과 clock이 같으면 바이트 단위로 같은 결과가 나온다.
    ///
    /// payload는 주어진 순서대로 배치되고, 에러가 나면 빌드 전체가 중단된다.
    pub fn build(
        &self,
        boot_code: &[u8],
        payloads: &[Payload],
        clock: NaiveDateTime,
    ) -> Result<FloppyImage, FloppyError> {
        let geo = &self.geometry;
        let stamp = FatTimestamp::from_datetime(&clock)?;
        let mut state = BuildState::new(geo);

        let boot = build_boot_sector(boot_code, geo, &self.volume)?;
        state.write_at(0, &boot);

        let mut files = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let report = state.add_file(geo, payload, stamp, self.name_mode)?;
            tracing::debug!(
                name = %report.short_name,
                size = report.size,
                first_cluster = report.run.first,
                clusters = report.run.count,
                "file placed"
            );
            files.push(report);
        }

        let fat = fat12::encode_entries(state.allocator.entries(), geo.fat_bytes())?;
        for copy in 0..geo.fat_copies {
            state.write_at(geo.fat_copy_offset(copy), &fat);
        }

        let root = directory::encode_root_directory(&state.records, geo.root_entries, geo.root_bytes())?;
        state.write_at(geo.root_offset(), &root);

        let report = BuildReport {
            geometry: *geo,
            boot_code_len: boot_code.len(),
            files,
            used_clusters: state.allocator.used_clusters(),
            free_clusters: state.allocator.free_clusters(),
        };
        Ok(FloppyImage {
            bytes: state.image,
            report,
        })
    }
}
