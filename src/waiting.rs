use crate::shared;
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

// Pulled out of the apk: the flag check XORs the hex sha256 of the package
// name against this key
const BYTE_KEY: [u8; 48] = [
    0x71, 0x67, 0x23, 0x4a, 0x23, 0x08, 0x01, 0x01, 0x67, 0x05, 0x41, 0x41, 0x03, 0x5b, 0x51, 0x3a,
    0x51, 0x5e, 0x17, 0x5c, 0x6a, 0x4d, 0x52, 0x09, 0x48, 0x57, 0x14, 0x05, 0x5a, 0x5f, 0x6a, 0x05,
    0x0c, 0x06, 0x05, 0x0d, 0x50, 0x69, 0x05, 0x54, 0x55, 0x58, 0x51, 0x07, 0x0e, 0x4b, 0x10, 0x18,
];
const PACKAGE_NAME: &str = "com.example.waiting";

pub fn generate_flag(package: &str, key: &[u8]) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(package);
    let digest = hex::encode(hasher.finalize());
    if key.len() > digest.len() {
        return Err(anyhow!(
            "Key is {} bytes but the digest only has {} characters",
            key.len(),
            digest.len()
        ));
    }

    let flag = shared::xor_with_key(&digest.as_bytes()[..key.len()], key)?;
    Ok(String::from_utf8(flag)?)
}

pub fn print_flag() -> Result<()> {
    let flag = generate_flag(PACKAGE_NAME, &BYTE_KEY)?;
    println!("[+] Flag is {}", flag);

    Ok(())
}
