use models::fat::{is_end_of_chain, media_entry, FAT_END_OF_CHAIN, FAT_FREE, FIRST_DATA_CLUSTER};
use models::{FloppyError, Geometry};

/// 파일 하나에 할당된 연속 클러스터 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRun {
    pub first: u16,
    pub count: u16,
}

impl ClusterRun {
    pub fn clusters(&self) -> impl Iterator<Item = u16> {
        self.first..self.first + self.count
    }

    pub fn last(&self) -> u16 {
        self.first + self.count - 1
    }
}

/// FAT 엔트리 arena를 소유하고 앞에서부터 클러스터를 나눠준다.
#[derive(Debug, Clone)]
pub struct ClusterAllocator {
    fat: Vec<u16>,
    next_free: u16,
    cluster_size: usize,
}

impl ClusterAllocator {
    pub fn new(geometry: &Geometry) -> Self {
        let mut fat = vec![FAT_FREE; geometry.fat_entry_count()];
        fat[0] = media_entry(geometry.media_descriptor);
        fat[1] = FAT_END_OF_CHAIN;

        Self {
            fat,
            next_free: FIRST_DATA_CLUSTER,
            cluster_size: geometry.cluster_size(),
        }
    }

    /// `len` 바이트가 차지하는 클러스터 수. 빈 파일도 1개를 쓴다.
    pub fn clusters_needed(&self, len: usize) -> usize {
        len.div_ceil(self.cluster_size).max(1)
    }

    /// `len` 바이트만큼 구간을 예약하고 FAT에 연결한다.
    /// 공간이 부족하면 상태는 그대로 남는다.
    pub fn allocate(&mut self, len: usize) -> Result<ClusterRun, FloppyError> {
        let needed = self.clusters_needed(len);
        let available = self.free_clusters();
        if needed > available as usize {
            return Err(FloppyError::OutOfSpace {
                requested: u32::try_from(needed).unwrap_or(u32::MAX),
                available,
            });
        }

        // `needed`는 arena 길이 이하이므로 u16에 들어간다
        let run = ClusterRun {
            first: self.next_free,
            count: needed as u16,
        };
        for cluster in run.clusters() {
            self.fat[cluster as usize] = if cluster == run.last() {
                FAT_END_OF_CHAIN
            } else {
                cluster + 1
            };
        }
        self.next_free += run.count;

        tracing::debug!(first = run.first, count = run.count, "allocated cluster run");
        Ok(run)
    }

    pub fn next_free(&self) -> u16 {
        self.next_free
    }

    pub fn used_clusters(&self) -> u32 {
        (self.next_free - FIRST_DATA_CLUSTER) as u32
    }

    pub fn free_clusters(&self) -> u32 {
        (self.fat.len() - self.next_free as usize) as u32
    }

    /// 예약 슬롯을 포함한 전체 엔트리 테이블
    pub fn entries(&self) -> &[u16] {
        &self.fat
    }

    /// `first`에서 시작하는 체인을 따라간다.
    pub fn chain(&self, first: u16) -> Result<Vec<u16>, FloppyError> {
        follow_chain(&self.fat, first)
    }
}

/// FAT 체인 순회. 빈 클러스터 링크, 범위 밖 링크, 순환은 에러
pub fn follow_chain(fat: &[u16], first: u16) -> Result<Vec<u16>, FloppyError> {
    let mut chain = Vec::new();
    let mut current = first;

    loop {
        if current < FIRST_DATA_CLUSTER || current as usize >= fat.len() {
            return Err(FloppyError::parse(
                "FAT chain",
                format!("cluster {} is outside the data region", current),
            ));
        }
        if chain.len() >= fat.len() {
            return Err(FloppyError::parse(
                "FAT chain",
                format!("chain starting at {} loops", first),
            ));
        }
        chain.push(current);

        let next = fat[current as usize];
        if is_end_of_chain(next) {
            return Ok(chain);
        }
        if next == FAT_FREE {
            return Err(FloppyError::parse(
                "FAT chain",
                format!("cluster {} links to a free cluster", current),
            ));
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::FloppyConfig;

    fn floppy() -> ClusterAllocator {
        ClusterAllocator::new(&Geometry::compute(&FloppyConfig::default()).unwrap())
    }

    #[test]
    fn reserved_entries_are_preset() {
        let alloc = floppy();
        assert_eq!(alloc.entries()[0], 0xFF0);
        assert_eq!(alloc.entries()[1], 0xFFF);
        assert_eq!(alloc.entries().len(), 2849);
        assert_eq!(alloc.free_clusters(), 2847);
    }

    #[test]
    fn chain_length_follows_file_size() {
        let cases = [(0usize, 1u16), (1, 1), (511, 1), (512, 1), (513, 2), (1536, 3), (10_000, 20)];
        let mut alloc = floppy();

        for (len, expected) in cases {
            let run = alloc.allocate(len).unwrap();
            assert_eq!(run.count, expected, "length {}", len);

            let chain = alloc.chain(run.first).unwrap();
            assert_eq!(chain.len(), expected as usize);
            assert_eq!(chain, run.clusters().collect::<Vec<_>>());
            assert_eq!(alloc.entries()[run.last() as usize], FAT_END_OF_CHAIN);
        }
    }

    #[test]
    fn runs_are_contiguous_and_disjoint() {
        let mut alloc = floppy();
        let a = alloc.allocate(1500).unwrap();
        let b = alloc.allocate(0).unwrap();
        let c = alloc.allocate(600).unwrap();

        assert_eq!(a, ClusterRun { first: 2, count: 3 });
        assert_eq!(b, ClusterRun { first: 5, count: 1 });
        assert_eq!(c, ClusterRun { first: 6, count: 2 });
        assert_eq!(&alloc.entries()[2..8], &[3, 4, 0xFFF, 0xFFF, 7, 0xFFF]);
        assert_eq!(alloc.used_clusters(), 6);
        assert_eq!(alloc.next_free(), 8);
    }

    #[test]
    fn out_of_space_leaves_state_untouched() {
        let mut alloc = floppy();
        alloc.allocate(2840 * 512).unwrap();
        let before = alloc.clone();

        match alloc.allocate(8 * 512) {
            Err(FloppyError::OutOfSpace { requested, available }) => {
                assert_eq!(requested, 8);
                assert_eq!(available, 7);
            }
            other => panic!("expected OutOfSpace, got {:?}", other),
        }
        assert_eq!(alloc.entries(), before.entries());
        assert_eq!(alloc.next_free(), before.next_free());

        alloc.allocate(7 * 512).unwrap();
        assert_eq!(alloc.free_clusters(), 0);
        assert!(alloc.allocate(0).is_err());
    }

    #[test]
    fn chain_walk_detects_loops() {
        let fat = vec![0xFF0, 0xFFF, 3, 2];
        assert!(follow_chain(&fat, 2).is_err());
        let fat = vec![0xFF0, 0xFFF, 3, 0];
        assert!(follow_chain(&fat, 2).is_err());
    }
}
