//! 테스트용 키와 코덱.

use super::{HashParams, TokenCodec, TokenKeys};

pub(crate) const PRIVATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/rsa_private.pem");
pub(crate) const PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/rsa_public.pem");
const OTHER_PRIVATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/rsa_private_other.pem");
const OTHER_PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/rsa_public_other.pem");

/// 최소 비용 해시 파라미터.
pub(crate) const FAST_HASH: HashParams = HashParams {
    time_cost: 2,
    memory_kb: 32 * 1024,
    parallelism: 1,
    output_len: 32,
};

pub(crate) fn test_codec() -> TokenCodec {
    TokenCodec::new(TokenKeys::from_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap())
}

/// 다른 키 쌍으로 서명하는 코덱.
pub(crate) fn other_codec() -> TokenCodec {
    TokenCodec::new(TokenKeys::from_pem(OTHER_PRIVATE_PEM, OTHER_PUBLIC_PEM).unwrap())
}
