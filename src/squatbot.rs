use anyhow::Result;

// Hex blobs carved from the bot's config. Each one is stored reversed and
// XORed with a single byte
const SEGMENTS: [&str; 7] = [
    "6f722f5c645d4b57",
    "794066732c6b2c73",
    "406c6c2c732c732e",
    "732e6b6c406b6a7d",
    "6b7c2c6b2c7b4073",
    "2c737d2b",
    "62",
];
const XOR_KEY: u8 = 0x1f;

pub fn decode_segments(segments: &[&str]) -> Result<String> {
    let mut message = String::new();
    for segment in segments {
        let bytes = hex::decode(segment)?;
        message.extend(bytes.iter().rev().map(|b| char::from(b ^ XOR_KEY)));
    }

    Ok(message)
}

pub fn print_message() -> Result<()> {
    println!("{}", decode_segments(&SEGMENTS)?);

    Ok(())
}
