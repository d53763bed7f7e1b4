//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.
//!
//! 해시 문자열 형식:
//!
//! ```text
//! $argon2id$v=19$m=<메모리 KB>,t=<반복>,p=<병렬도>$<salt>$<digest>
//! ```
//!
//! salt와 digest는 패딩 없는 표준 base64로 인코딩됩니다.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use ollm_core::PasswordConfig;
use rand::{rngs::OsRng, RngCore};

/// 해시 문자열의 알고리즘 태그.
pub const ALGORITHM_TAG: &str = "argon2id";

/// 지원하는 Argon2 버전 (0x13).
pub const ARGON2_VERSION: u32 = 0x13;

/// salt 길이 (바이트).
pub const SALT_LEN: usize = 16;

/// 메모리 비용 상한 (KB, 1 GiB).
pub const MAX_MEMORY_KB: u32 = 1024 * 1024;

/// 시간 비용 상한.
pub const MAX_TIME_COST: u32 = 16;

/// 병렬도 상한.
pub const MAX_PARALLELISM: u32 = 64;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("빈 비밀번호는 허용되지 않습니다")]
    EmptyInput,
    #[error("잘못된 해시 파라미터: {0}")]
    InvalidParameters(&'static str),
    #[error("잘못된 해시 형식: {0}")]
    MalformedHash(&'static str),
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
}

/// Argon2id 비용 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// 반복 횟수 (최소 2)
    pub time_cost: u32,
    /// 메모리 비용 KB (최소 32768)
    pub memory_kb: u32,
    /// 병렬도 (1~64)
    pub parallelism: u32,
    /// 출력 길이 바이트 (16~512)
    pub output_len: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            time_cost: 3,
            memory_kb: 64 * 1024,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl From<PasswordConfig> for HashParams {
    fn from(config: PasswordConfig) -> Self {
        Self {
            time_cost: config.time_cost,
            memory_kb: config.memory_kb,
            parallelism: config.parallelism,
            output_len: config.output_len,
        }
    }
}

impl HashParams {
    /// 파라미터 검증.
    ///
    /// 첫 번째로 위반된 규칙을 반환합니다. 검사 순서: 시간 비용, 메모리 비용,
    /// 병렬도 하한/상한, 출력 길이 하한/상한, 병렬도당 메모리,
    /// 그리고 검증 시에도 적용되는 시간/메모리 비용 상한.
    pub fn validate(&self) -> Result<(), PasswordError> {
        if self.time_cost < 2 {
            return Err(PasswordError::InvalidParameters("time cost too low (min: 2)"));
        }
        if self.memory_kb < 32 * 1024 {
            return Err(PasswordError::InvalidParameters(
                "memory cost too low (min: 32768 KB)",
            ));
        }
        if self.parallelism < 1 {
            return Err(PasswordError::InvalidParameters(
                "parallelism must be at least 1",
            ));
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(PasswordError::InvalidParameters(
                "parallelism exceeds maximum (max: 64)",
            ));
        }
        if self.output_len < 16 {
            return Err(PasswordError::InvalidParameters(
                "output length too short (min: 16 bytes)",
            ));
        }
        if self.output_len > 512 {
            return Err(PasswordError::InvalidParameters(
                "output length too long (max: 512 bytes)",
            ));
        }
        if self.memory_kb < self.parallelism * 8 * 1024 {
            return Err(PasswordError::InvalidParameters(
                "memory cost must be at least 8192 KB per lane",
            ));
        }
        if self.time_cost > MAX_TIME_COST {
            return Err(PasswordError::InvalidParameters("time cost exceeds maximum (max: 16)"));
        }
        if self.memory_kb > MAX_MEMORY_KB {
            return Err(PasswordError::InvalidParameters(
                "memory cost exceeds maximum (max: 1048576 KB)",
            ));
        }
        Ok(())
    }
}

/// 비밀번호 해싱.
///
/// 호출마다 새로운 16바이트 salt를 생성합니다. `params`가 `None`이면
/// 기본 파라미터(t=3, m=65536, p=4, 32바이트)를 사용합니다.
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password", None).unwrap();
/// // "$argon2id$v=19$m=65536,t=3,p=4$..."
/// ```
pub fn hash_password(password: &str, params: Option<&HashParams>) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyInput);
    }

    let params = params.copied().unwrap_or_default();
    params.validate()?;

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let digest = derive(
        password.as_bytes(),
        &salt,
        params.memory_kb,
        params.time_cost,
        params.parallelism,
        params.output_len as usize,
    )
    .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(format!(
        "${}$v={}$m={},t={},p={}${}${}",
        ALGORITHM_TAG,
        ARGON2_VERSION,
        params.memory_kb,
        params.time_cost,
        params.parallelism,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(digest),
    ))
}

/// 비밀번호 검증.
///
/// 해시에 포함된 파라미터와 salt로 digest를 다시 계산하고 상수 시간으로 비교합니다.
/// 비밀번호가 틀리면 `Ok(false)`를 반환하며, 해시 형식이 잘못된 경우에만 에러입니다.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let parsed = parse_hash(encoded)?;

    let computed = derive(
        password.as_bytes(),
        &parsed.salt,
        parsed.memory_kb,
        parsed.time_cost,
        parsed.parallelism,
        parsed.digest.len(),
    )
    .map_err(|_| PasswordError::MalformedHash("embedded parameters rejected"))?;

    Ok(constant_time_eq(&parsed.digest, &computed))
}

fn derive(
    password: &[u8],
    salt: &[u8],
    memory_kb: u32,
    time_cost: u32,
    parallelism: u32,
    output_len: usize,
) -> Result<Vec<u8>, argon2::Error> {
    let params = Params::new(memory_kb, time_cost, parallelism, Some(output_len))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = vec![0u8; output_len];
    argon2.hash_password_into(password, salt, &mut output)?;
    Ok(output)
}

#[derive(Debug)]
struct ParsedHash {
    memory_kb: u32,
    time_cost: u32,
    parallelism: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse_hash(encoded: &str) -> Result<ParsedHash, PasswordError> {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 6 || !parts[0].is_empty() || parts[1] != ALGORITHM_TAG {
        return Err(PasswordError::MalformedHash("must start with $argon2id$"));
    }

    let version: u32 = parts[2]
        .strip_prefix("v=")
        .and_then(|v| v.parse().ok())
        .ok_or(PasswordError::MalformedHash("invalid version field"))?;
    if version != ARGON2_VERSION {
        return Err(PasswordError::MalformedHash("unsupported argon2 version"));
    }

    let (memory_kb, time_cost, parallelism) = parse_param_block(parts[3])
        .ok_or(PasswordError::MalformedHash("invalid parameter block"))?;
    if memory_kb > MAX_MEMORY_KB || time_cost > MAX_TIME_COST || parallelism > MAX_PARALLELISM {
        return Err(PasswordError::MalformedHash("embedded cost exceeds limit"));
    }

    let salt = STANDARD_NO_PAD
        .decode(parts[4])
        .map_err(|_| PasswordError::MalformedHash("undecodable salt"))?;
    let digest = STANDARD_NO_PAD
        .decode(parts[5])
        .map_err(|_| PasswordError::MalformedHash("undecodable digest"))?;

    Ok(ParsedHash {
        memory_kb,
        time_cost,
        parallelism,
        salt,
        digest,
    })
}

/// `m=<u32>,t=<u32>,p=<u32>` 파싱.
fn parse_param_block(block: &str) -> Option<(u32, u32, u32)> {
    let mut fields = block.split(',');
    let memory = fields.next()?.strip_prefix("m=")?.parse().ok()?;
    let time = fields.next()?.strip_prefix("t=")?.parse().ok()?;
    let lanes = fields.next()?.strip_prefix("p=")?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((memory, time, lanes))
}

/// 길이가 같은 입력에 대해 내용과 무관하게 모든 바이트를 비교.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
