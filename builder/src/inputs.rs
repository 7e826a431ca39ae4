use std::fs;
use std::path::{Path, PathBuf};

use models::FloppyError;

use crate::image::Payload;

/// `source`에서 읽어 루트 디렉토리에 `target` 이름으로 저장할 payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub target: String,
    pub source: PathBuf,
}

/// 빌드 디렉토리에서 플로피에 들어갈 파일 목록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputManifest {
    pub boot_code: PathBuf,
    pub payloads: Vec<InputSpec>,
}

impl InputManifest {
    /// 부트로더 구성: `stage1.bin`은 부트 섹터, stage2와 커널은 파일로 복사
    pub fn for_build_dir(build_dir: &Path) -> Self {
        let payload = |target: &str, file: &str| InputSpec {
            target: target.to_string(),
            source: build_dir.join(file),
        };

        Self {
            boot_code: build_dir.join("stage1.bin"),
            payloads: vec![
                payload("STAGE2.BIN", "stage2.bin"),
                payload("KERNEL.BIN", "kernel.bin"),
            ],
        }
    }
}

#[derive(Debug)]
pub struct LoadedInputs {
    pub boot_code: Vec<u8>,
    pub payloads: Vec<Payload>,
    /// 건너뛴 payload의 `MissingInput` 에러
    pub skipped: Vec<FloppyError>,
}

/// manifest의 파일을 모두 읽는다. 부트 섹터가 없으면 실패,
/// payload가 없으면 경고를 남기고 건너뛴다.
pub fn load_inputs(manifest: &InputManifest) -> Result<LoadedInputs, FloppyError> {
    let boot_code = fs::read(&manifest.boot_code).map_err(|source| FloppyError::MissingBootCode {
        path: manifest.boot_code.clone(),
        source,
    })?;
    tracing::info!(
        "Boot sector: {} ({} bytes)",
        manifest.boot_code.display(),
        boot_code.len()
    );

    let mut payloads = Vec::new();
    let mut skipped = Vec::new();
    for spec in &manifest.payloads {
        match fs::read(&spec.source) {
            Ok(data) => {
                tracing::info!(
                    "Added file: {} -> {} ({} bytes)",
                    spec.target,
                    spec.source.display(),
                    data.len()
                );
                payloads.push(Payload::new(spec.target.clone(), data));
            }
            Err(source) => {
                let err = FloppyError::MissingInput {
                    path: spec.source.clone(),
                    source,
                };
                tracing::warn!("{}, skipping", err);
                skipped.push(err);
            }
        }
    }

    Ok(LoadedInputs {
        boot_code,
        payloads,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("floppy-inputs-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_manifest_maps_build_outputs() {
        let manifest = InputManifest::for_build_dir(Path::new("build"));
        assert_eq!(manifest.boot_code, Path::new("build").join("stage1.bin"));
        assert_eq!(manifest.payloads[0].target, "STAGE2.BIN");
        assert_eq!(manifest.payloads[1].source, Path::new("build").join("kernel.bin"));
    }

    #[test]
    fn missing_payload_is_skipped() {
        let dir = scratch_dir("skip");
        fs::write(dir.join("stage1.bin"), [0xEB, 0x3C, 0x90]).unwrap();
        fs::write(dir.join("kernel.bin"), b"kernel").unwrap();

        let loaded = load_inputs(&InputManifest::for_build_dir(&dir)).unwrap();
        assert_eq!(loaded.boot_code, vec![0xEB, 0x3C, 0x90]);
        assert_eq!(loaded.payloads, vec![Payload::new("KERNEL.BIN", b"kernel".to_vec())]);
        assert_eq!(loaded.skipped.len(), 1);
        assert!(matches!(
            &loaded.skipped[0],
            FloppyError::MissingInput { path, .. } if path.ends_with("stage2.bin")
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_boot_code_is_fatal() {
        let dir = scratch_dir("noboot");
        fs::write(dir.join("kernel.bin"), b"kernel").unwrap();

        let err = load_inputs(&InputManifest::for_build_dir(&dir)).unwrap_err();
        assert!(matches!(err, FloppyError::MissingBootCode { .. }));

        fs::remove_dir_all(&dir).unwrap();
    }
}
