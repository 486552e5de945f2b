//! 32-byte word encoding helpers used by structured hashing and calldata envelopes.

use alloy_primitives::{Address, B256, U256};

pub const WORD: usize = 32;
pub const ADDRESS_WIDTH: usize = 20;

/// Left-pad an address into a 32-byte ABI word.
pub fn address_word(address: Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - ADDRESS_WIDTH..].copy_from_slice(address.as_slice());
    word
}

pub fn u256_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

pub fn u64_word(value: u64) -> [u8; WORD] {
    u256_word(U256::from(value))
}

/// Concatenate 32-byte words into one buffer (the `abi.encode` layout of static fields).
pub fn concat_words(words: &[&[u8; WORD]]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(words.len() * WORD);
    for word in words {
        buf.extend_from_slice(word.as_slice());
    }
    buf
}

/// Split `data` into `(head, trailing address)` when it is exactly `head_len + 20` bytes long.
pub fn split_trailing_address(data: &[u8], head_len: usize) -> Option<(&[u8], Address)> {
    if data.len() != head_len.checked_add(ADDRESS_WIDTH)? {
        return None;
    }
    let (head, tail) = data.split_at(head_len);
    Some((head, Address::from_slice(tail)))
}

pub fn b256_word(value: B256) -> [u8; WORD] {
    value.0
}
