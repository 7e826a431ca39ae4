//! FAT12 엔트리 값 정의

/// 빈 클러스터
pub const FAT_FREE: u16 = 0x000;
/// 이 도구가 만드는 모든 체인의 마지막 값
pub const FAT_END_OF_CHAIN: u16 = 0xFFF;
/// 이 값 이상이면 체인 종료
pub const FAT_EOC_MIN: u16 = 0xFF8;
/// 12비트 엔트리가 담을 수 있는 최댓값
pub const FAT12_MASK: u16 = 0x0FFF;

/// 데이터 영역에 대응하는 첫 번째 클러스터 번호
pub const FIRST_DATA_CLUSTER: u16 = 2;
/// 이보다 클러스터가 많으면 드라이버가 볼륨을 FAT16으로 판정한다
pub const FAT12_MAX_CLUSTERS: u32 = 4084;
/// FAT12에서 쓸 수 있는 마지막 클러스터 번호 (0xFF5)
pub const LAST_DATA_CLUSTER: u16 = FIRST_DATA_CLUSTER + FAT12_MAX_CLUSTERS as u16 - 1;

/// 엔트리 0의 하위 바이트에는 media descriptor가 들어간다.
pub fn media_entry(media_descriptor: u8) -> u16 {
    0xF00 | media_descriptor as u16
}

pub fn is_end_of_chain(entry: u16) -> bool {
    entry >= FAT_EOC_MIN
}
