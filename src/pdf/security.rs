//! # Standard Security Handler
//!
//! Revision 2 of the PDF standard security handler: 40-bit RC4 with
//! MD5-derived keys. Every stream and string is encrypted with a key
//! derived from the file key and its object number.
//!
//! The document ID feeding the key derivation is computed from the
//! document content, so protected output stays reproducible.

use md5::{Digest, Md5};
use rc4::consts::{U10, U5};
use rc4::{KeyInit, Rc4, StreamCipher};

use crate::model::Protection;

const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

#[derive(Debug, Clone)]
pub struct SecurityHandler {
    key: [u8; 5],
    owner_entry: [u8; 32],
    user_entry: [u8; 32],
    permissions: i32,
    file_id: [u8; 16],
}

impl SecurityHandler {
    pub fn new(protection: &Protection, file_id: [u8; 16]) -> Self {
        let flags: i32 = protection.permissions.iter().map(|p| p.flag()).fold(0, |a, f| a | f);
        let permissions = -(((192 | flags) ^ 255) + 1);

        let owner_password = if protection.owner_password.is_empty() {
            &protection.user_password
        } else {
            &protection.owner_password
        };
        let user_padded = pad_password(&protection.user_password);

        let owner_key = first_n::<5>(&Md5::digest(pad_password(owner_password)));
        let mut owner_entry = user_padded;
        rc4_40(&owner_key, &mut owner_entry);

        let mut hasher = Md5::new();
        hasher.update(user_padded);
        hasher.update(owner_entry);
        hasher.update(permissions.to_le_bytes());
        hasher.update(file_id);
        let key = first_n::<5>(&hasher.finalize());

        let mut user_entry = PADDING;
        rc4_40(&key, &mut user_entry);

        Self {
            key,
            owner_entry,
            user_entry,
            permissions,
            file_id,
        }
    }

    /// Derive a file ID from content that is already fixed.
    pub fn file_id(content: &[&[u8]]) -> [u8; 16] {
        let mut hasher = Md5::new();
        for part in content {
            hasher.update(part);
        }
        first_n::<16>(&hasher.finalize())
    }

    pub fn permissions(&self) -> i32 {
        self.permissions
    }

    /// Encrypt `data` belonging to object `obj_num` (generation 0).
    pub fn encrypt(&self, obj_num: usize, data: &[u8]) -> Vec<u8> {
        let mut hasher = Md5::new();
        hasher.update(self.key);
        hasher.update(&(obj_num as u32).to_le_bytes()[..3]);
        hasher.update([0u8, 0u8]);
        let object_key = first_n::<10>(&hasher.finalize());

        let mut out = data.to_vec();
        let mut cipher = Rc4::<U10>::new(&object_key.into());
        cipher.apply_keystream(&mut out);
        out
    }

    /// The `/Encrypt` dictionary.
    pub fn encrypt_dict(&self) -> String {
        format!(
            "<< /Filter /Standard /V 1 /R 2 /O <{}> /U <{}> /P {} >>",
            hex(&self.owner_entry),
            hex(&self.user_entry),
            self.permissions
        )
    }

    /// The trailer `/ID` array.
    pub fn id_array(&self) -> String {
        let id = hex(&self.file_id);
        format!("[<{}> <{}>]", id, id)
    }
}

fn pad_password(password: &str) -> [u8; 32] {
    let mut padded = PADDING;
    let bytes: Vec<u8> = password
        .chars()
        .filter_map(|c| u8::try_from(c as u32).ok())
        .take(32)
        .collect();
    padded[..bytes.len()].copy_from_slice(&bytes);
    padded[bytes.len()..].copy_from_slice(&PADDING[..32 - bytes.len()]);
    padded
}

fn rc4_40(key: &[u8; 5], data: &mut [u8]) {
    let mut cipher = Rc4::<U5>::new(&(*key).into());
    cipher.apply_keystream(data);
}

fn first_n<const N: usize>(digest: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&digest[..N]);
    out
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
