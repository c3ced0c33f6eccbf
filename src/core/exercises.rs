//! Small computations kept as disassembly practice targets. `#[inline(never)]`
//! keeps each one as its own symbol in release builds.

use std::hint::black_box;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::core::error::LabError;

/// Base64 payload of the hidden-code sample.
pub const HIDDEN_CODE: &str = "cHJpbnQoIkhlbGxvIFdvcmxkIik=";
/// XOR-1 encoded greeting.
pub const ENCODED_GREETING: &str = "Ifmmp!Xpsme";
/// XOR-0x42 encoded message.
pub const ENCODED_MESSAGE: &str =
    "K\x1a\x1e\x1e\x1f\x1c\x1a\x1e\x1f\x1c\x1a\x1e\x1f";

#[inline(never)]
pub fn add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

#[inline(never)]
pub fn classify(x: i64) -> &'static str {
    if x > 100 {
        "very large"
    } else if x > 50 {
        "large"
    } else if x > 25 {
        "medium"
    } else if x > 10 {
        "small"
    } else {
        "tiny"
    }
}

#[inline(never)]
pub fn fibonacci(n: u32) -> u64 {
    if n <= 1 {
        return n as u64;
    }
    fibonacci(n - 1) + fibonacci(n - 2)
}

#[inline(never)]
pub fn flip_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().map(|b| b ^ 0xff).collect()
}

#[inline(never)]
pub fn authenticate(username: &str, password: &str) -> bool {
    username == "admin" && password == "secret"
}

fn xor_chars(encoded: &str, key: u32) -> String {
    encoded
        .chars()
        .map(|c| char::from_u32(c as u32 ^ key).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[inline(never)]
pub fn decode_string(encoded: &str) -> String {
    xor_chars(encoded, 1)
}

#[inline(never)]
pub fn decode_message(encoded: &str) -> String {
    xor_chars(encoded, 0x42)
}

/// Decodes a base64 payload; bytes that are not UTF-8 are replaced.
#[inline(never)]
pub fn decode_hidden_code(encoded: &str) -> Result<String, LabError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[inline(never)]
pub fn obfuscated_logic(x: i64) -> &'static str {
    if x > 0 {
        if x < 10 {
            if x % 2 == 0 {
                "even small positive"
            } else {
                "odd small positive"
            }
        } else {
            "large positive"
        }
    } else {
        "negative or zero"
    }
}

#[inline(never)]
pub fn complex_logic(x: i64, y: i64) -> i64 {
    if x > 0 {
        if y > 0 {
            if x > y {
                x.wrapping_add(y)
            } else {
                y.wrapping_sub(x)
            }
        } else {
            x.wrapping_mul(2)
        }
    } else if y > 0 {
        y.wrapping_mul(2)
    } else {
        0
    }
}

/// `sum([1, 2, 3, 4, 5]) * 2 - 10`, spelled out step by step.
#[inline(never)]
pub fn obfuscated_function() -> i64 {
    let a = black_box([1i64, 2, 3, 4, 5]);
    let b: i64 = a.iter().sum();
    let c = b * 2;
    c - 10
}

/// Labelled results, one line each.
pub fn report() -> Vec<String> {
    let sample = black_box(b"re-lab".as_slice());
    vec![
        format!("add(10, 20) = {}", add(black_box(10), black_box(20))),
        format!("classify(42) = {}", classify(black_box(42))),
        format!("fibonacci(10) = {}", fibonacci(black_box(10))),
        format!(
            "flip_bytes({}) = {}",
            hex::encode(sample),
            hex::encode(flip_bytes(sample))
        ),
        format!(
            "authenticate(admin, secret) = {}",
            authenticate(black_box("admin"), black_box("secret"))
        ),
        format!(
            "authenticate(admin, hunter2) = {}",
            authenticate(black_box("admin"), black_box("hunter2"))
        ),
        format!(
            "decode_string({ENCODED_GREETING:?}) = {:?}",
            decode_string(black_box(ENCODED_GREETING))
        ),
        format!(
            "decode_message({ENCODED_MESSAGE:?}) = {:?}",
            decode_message(black_box(ENCODED_MESSAGE))
        ),
        match decode_hidden_code(black_box(HIDDEN_CODE)) {
            Ok(code) => format!("decode_hidden_code({HIDDEN_CODE}) = {code}"),
            Err(e) => format!("decode_hidden_code({HIDDEN_CODE}) failed: {e}"),
        },
        format!("obfuscated_logic(4) = {}", obfuscated_logic(black_box(4))),
        format!(
            "complex_logic(3, 7) = {}",
            complex_logic(black_box(3), black_box(7))
        ),
        format!("obfuscated_function() = {}", obfuscated_function()),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(101), "very large");
        assert_eq!(classify(100), "large");
        assert_eq!(classify(51), "large");
        assert_eq!(classify(50), "medium");
        assert_eq!(classify(26), "medium");
        assert_eq!(classify(25), "small");
        assert_eq!(classify(11), "small");
        assert_eq!(classify(10), "tiny");
        assert_eq!(classify(-5), "tiny");
    }

    #[test]
    fn test_fibonacci() {
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(fibonacci(n as u32), *want);
        }
    }

    #[test]
    fn test_flip_bytes_is_involution() {
        let data = b"\x00\x0f\xf0\xff abc";
        assert_eq!(flip_bytes(&[0x00, 0xff, 0x5a]), vec![0xff, 0x00, 0xa5]);
        assert_eq!(flip_bytes(&flip_bytes(data)), data.to_vec());
    }

    #[test]
    fn test_authenticate() {
        assert!(authenticate("admin", "secret"));
        assert!(!authenticate("admin", "Secret"));
        assert!(!authenticate("root", "secret"));
    }

    #[test]
    fn test_xor_decoders() {
        assert_eq!(decode_string(ENCODED_GREETING), "Hello World");
        assert_eq!(decode_string(&decode_string("round trip")), "round trip");
        assert_eq!(decode_string(""), "");

        assert_eq!(decode_message(ENCODED_MESSAGE), "\tX\\\\]^X\\]^X\\]");
        assert_eq!(decode_message("\x42"), "\0");
    }

    #[test]
    fn test_decode_hidden_code() {
        assert_eq!(
            decode_hidden_code(HIDDEN_CODE).unwrap(),
            "print(\"Hello World\")"
        );
        assert_eq!(decode_hidden_code("").unwrap(), "");
        assert!(matches!(
            decode_hidden_code("not base64!"),
            Err(LabError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_obfuscated_logic_boundaries() {
        assert_eq!(obfuscated_logic(i64::MIN), "negative or zero");
        assert_eq!(obfuscated_logic(0), "negative or zero");
        assert_eq!(obfuscated_logic(1), "odd small positive");
        assert_eq!(obfuscated_logic(8), "even small positive");
        assert_eq!(obfuscated_logic(9), "odd small positive");
        assert_eq!(obfuscated_logic(10), "large positive");
    }

    #[test]
    fn test_complex_logic_branches() {
        assert_eq!(complex_logic(7, 3), 10);
        assert_eq!(complex_logic(3, 7), 4);
        assert_eq!(complex_logic(5, 5), 0);
        assert_eq!(complex_logic(4, 0), 8);
        assert_eq!(complex_logic(0, 6), 12);
        assert_eq!(complex_logic(-1, -1), 0);
        assert_eq!(complex_logic(0, 0), 0);
    }

    #[test]
    fn test_obfuscated_function() {
        assert_eq!(obfuscated_function(), 20);
    }

    #[test]
    fn test_report() {
        let lines = report();
        assert_eq!(lines[0], "add(10, 20) = 30");
        assert_eq!(lines[1], "classify(42) = medium");
        assert_eq!(lines[2], "fibonacci(10) = 55");
        assert_eq!(lines[3], "flip_bytes(72652d6c6162) = 8d9ad2939e9d");
        assert!(lines[4].ends_with("true"));
        assert!(lines[5].ends_with("false"));
        assert_eq!(lines[6], "decode_string(\"Ifmmp!Xpsme\") = \"Hello World\"");
        assert_eq!(
            lines[8],
            "decode_hidden_code(cHJpbnQoIkhlbGxvIFdvcmxkIik=) = print(\"Hello World\")"
        );
        assert_eq!(lines[9], "obfuscated_logic(4) = even small positive");
        assert_eq!(lines[10], "complex_logic(3, 7) = 4");
        assert_eq!(lines[11], "obfuscated_function() = 20");
    }
}
