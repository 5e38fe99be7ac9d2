/// Bitcoin Script type - a parsed sequence of opcodes and data pushes.
///
/// A `Script` owns its byte buffer and the chunk views parsed from it.
/// Construction always parses the whole buffer, so a `Script` value is
/// never a partially parsed program. The debug rendering and the multisig
/// detection result are computed on first use and cleared by every
/// mutating operation.

use std::fmt;
use std::sync::OnceLock;

use crate::address::{Address, AddressType, Network};
use crate::chunk::{encode_push, parse_chunks, PushWidth, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// Largest standard bare multisig key count.
const MAX_STANDARD_MULTISIG_KEYS: usize = 3;

/// The `(m, keys)` requirement of an `OP_m <keys> OP_n OP_CHECKMULTISIG` script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultisigRequirement {
    /// Number of signatures required (`m`).
    pub required: usize,
    /// Serialized public keys in script order (`n` of them).
    pub public_keys: Vec<Vec<u8>>,
}

/// A Bitcoin script.
#[derive(Clone)]
pub struct Script {
    bytes: Vec<u8>,
    chunks: Vec<ScriptChunk>,
    rendered: OnceLock<String>,
    multisig: OnceLock<Option<MultisigRequirement>>,
}

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script {
            bytes: Vec::new(),
            chunks: Vec::new(),
            rendered: OnceLock::new(),
            multisig: OnceLock::new(),
        }
    }

    /// Parse a script from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw script bytes.
    ///
    /// # Returns
    /// The parsed `Script`, or `DataTooSmall` if any push is truncated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        Self::from_vec(bytes.to_vec())
    }

    /// Parse a script from an owned buffer without copying it.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self, ScriptError> {
        let chunks = parse_chunks(&bytes)?;
        Ok(Script {
            bytes,
            chunks,
            rendered: OnceLock::new(),
            multisig: OnceLock::new(),
        })
    }

    /// Parse a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Self::from_vec(hex::decode(hex_str)?)
    }

    /// Build a script from a space-separated ASM string.
    ///
    /// Known opcode names are emitted directly; any other token is parsed as
    /// hex and pushed with the minimal encoding.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            match string_to_opcode(token) {
                Some(op) => script.append_opcode(op)?,
                None => {
                    let data = hex::decode(token)
                        .map_err(|_| ScriptError::InvalidOpcodeData(token.to_string()))?;
                    script.append_data(&data)?;
                }
            }
        }
        Ok(script)
    }

    /// Build the canonical locking script paying to `address`.
    ///
    /// Pubkey-hash addresses produce
    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`; script-hash
    /// addresses produce `OP_HASH160 <hash> OP_EQUAL`.
    pub fn from_address(address: &Address) -> Self {
        let mut script = Script {
            bytes: Vec::with_capacity(25),
            chunks: Vec::with_capacity(5),
            rendered: OnceLock::new(),
            multisig: OnceLock::new(),
        };
        match address.address_type {
            AddressType::PubkeyHash => {
                script.push_template_op(OP_DUP);
                script.push_template_op(OP_HASH160);
                script.push_template_hash(&address.hash);
                script.push_template_op(OP_EQUALVERIFY);
                script.push_template_op(OP_CHECKSIG);
            }
            AddressType::ScriptHash => {
                script.push_template_op(OP_HASH160);
                script.push_template_hash(&address.hash);
                script.push_template_op(OP_EQUAL);
            }
        }
        script
    }

    /// Build a bare multisig script `OP_m <pk1> .. <pkn> OP_n OP_CHECKMULTISIG`.
    ///
    /// # Arguments
    /// * `public_keys` - Serialized public keys, in the order signatures must follow.
    /// * `required` - Number of signatures required (`m`).
    ///
    /// # Returns
    /// The script, or `InvalidMultisig` if `m` is zero, exceeds the key
    /// count, or either count falls outside 1..=16.
    pub fn multisig<K: AsRef<[u8]>>(public_keys: &[K], required: usize) -> Result<Self, ScriptError> {
        let n = public_keys.len();
        if required == 0 {
            return Err(ScriptError::InvalidMultisig("zero required signatures".to_string()));
        }
        if required > n {
            return Err(ScriptError::InvalidMultisig(format!(
                "{} required signatures but only {} keys",
                required, n
            )));
        }
        let small_int = |v: usize| {
            i64::try_from(v)
                .ok()
                .and_then(opcode_for_small_integer)
                .ok_or_else(|| ScriptError::InvalidMultisig(format!("{} is not a small integer", v)))
        };
        let m_op = small_int(required)?;
        let n_op = small_int(n)?;

        let mut bytes = vec![m_op];
        for key in public_keys {
            let key = key.as_ref();
            if key.is_empty() {
                return Err(ScriptError::InvalidMultisig("empty public key".to_string()));
            }
            bytes.extend_from_slice(&encode_push(key, PushWidth::Auto)?);
        }
        bytes.push(n_op);
        bytes.push(OP_CHECKMULTISIG);
        Self::from_vec(bytes)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Borrow the serialized script bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy the serialized script bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Render the script as ASM: opcodes by name, pushes as hex.
    ///
    /// `Script::from_asm` reads this back for minimally encoded scripts.
    pub fn to_asm(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| match chunk.data(&self.bytes) {
                Some(data) if !data.is_empty() => hex::encode(data),
                _ => opcode_to_string(chunk.op()).to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The debug rendering of every chunk, space separated.
    ///
    /// This form is lossy (see [`ScriptChunk::render`]) and never parsed back.
    pub fn debug_string(&self) -> &str {
        self.rendered.get_or_init(|| {
            self.chunks
                .iter()
                .map(|chunk| chunk.render(&self.bytes))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Length of the script in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // -----------------------------------------------------------------------
    // Chunk access
    // -----------------------------------------------------------------------

    /// The parsed chunks in script order.
    pub fn chunks(&self) -> &[ScriptChunk] {
        &self.chunks
    }

    /// Iterate over `(chunk, pushed data)` pairs; data is `None` for opcodes.
    pub fn operations(&self) -> impl Iterator<Item = (&ScriptChunk, Option<&[u8]>)> + '_ {
        self.chunks.iter().map(move |chunk| (chunk, chunk.data(&self.bytes)))
    }

    /// Borrow the payload of a chunk belonging to this script.
    pub fn chunk_data(&self, chunk: &ScriptChunk) -> Option<&[u8]> {
        chunk.data(&self.bytes)
    }

    /// Chunk at `index`; negative indices count from the end.
    pub fn chunk(&self, index: isize) -> Option<&ScriptChunk> {
        let idx = if index < 0 {
            self.chunks.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.chunks.get(idx)
    }

    /// Opcode at `index`, or `None` if the chunk is a push or out of range.
    pub fn opcode_at(&self, index: isize) -> Option<u8> {
        self.chunk(index).filter(|c| c.is_opcode()).map(|c| c.op())
    }

    /// Pushed payload at `index`, or `None` if the chunk is an opcode or out of range.
    pub fn pushed_data_at(&self, index: isize) -> Option<&[u8]> {
        self.chunk(index).and_then(|c| c.data(&self.bytes))
    }

    // -----------------------------------------------------------------------
    // Script classification
    // -----------------------------------------------------------------------

    /// Pay-to-pubkey: `<pubkey> OP_CHECKSIG`.
    pub fn is_p2pk(&self) -> bool {
        self.chunks.len() == 2
            && self.chunks[0].is_push()
            && self.chunks[0].data_len() > 1
            && self.opcode_at(1) == Some(OP_CHECKSIG)
    }

    /// Pay-to-pubkey-hash: `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        self.chunks.len() == 5
            && self.opcode_at(0) == Some(OP_DUP)
            && self.opcode_at(1) == Some(OP_HASH160)
            && self.is_push_of_len(2, 20)
            && self.opcode_at(3) == Some(OP_EQUALVERIFY)
            && self.opcode_at(4) == Some(OP_CHECKSIG)
    }

    /// Pay-to-script-hash: `OP_HASH160 <20 bytes> OP_EQUAL`, hash pushed compactly.
    pub fn is_p2sh(&self) -> bool {
        self.chunks.len() == 3 && self.ends_with_p2sh()
    }

    /// True if the last three chunks form a pay-to-script-hash tail.
    pub fn ends_with_p2sh(&self) -> bool {
        let n = self.chunks.len();
        n >= 3
            && self.opcode_at(-3) == Some(OP_HASH160)
            && self.is_push_of_len(n - 2, 20)
            && self.chunks[n - 2].is_compact()
            && self.opcode_at(-1) == Some(OP_EQUAL)
    }

    /// Bare multisig: `OP_m <pk1> .. <pkn> OP_n OP_CHECKMULTISIG` with 1 <= m <= n <= 16.
    pub fn is_multisig(&self) -> bool {
        self.multisig_requirement().is_some()
    }

    /// Multisig with at most three keys (relay policy, not consensus).
    pub fn is_standard_multisig(&self) -> bool {
        self.multisig_requirement()
            .map_or(false, |req| req.public_keys.len() <= MAX_STANDARD_MULTISIG_KEYS)
    }

    /// P2PKH, P2SH, P2PK or standard multisig.
    pub fn is_standard(&self) -> bool {
        self.is_p2pkh() || self.is_p2sh() || self.is_p2pk() || self.is_standard_multisig()
    }

    /// True if every chunk is a push or a small-integer literal (no opcode above OP_16).
    pub fn is_data_only(&self) -> bool {
        self.chunks.iter().all(|c| c.op() <= OP_16)
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// The memoized multisig requirement, detected on first call.
    pub fn multisig_requirement(&self) -> Option<&MultisigRequirement> {
        self.multisig.get_or_init(|| self.detect_multisig()).as_ref()
    }

    /// Public keys of a multisig script, in script order.
    pub fn multisig_public_keys(&self) -> Option<&[Vec<u8>]> {
        self.multisig_requirement().map(|req| req.public_keys.as_slice())
    }

    /// Required signature count (`m`) of a multisig script.
    pub fn multisig_required_signatures(&self) -> Option<usize> {
        self.multisig_requirement().map(|req| req.required)
    }

    /// Extract the 20-byte public key hash from a P2PKH script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        self.hash_at(2).ok_or(ScriptError::NotP2PKH)
    }

    /// Extract the 20-byte script hash from a P2SH script.
    pub fn script_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2sh() {
            return None;
        }
        self.hash_at(1)
    }

    /// The address this script pays to, for P2PKH and P2SH scripts.
    pub fn standard_address(&self, network: Network) -> Option<Address> {
        if let Ok(hash) = self.public_key_hash() {
            return Some(Address::from_public_key_hash(&hash, network));
        }
        self.script_hash()
            .map(|hash| Address::from_script_hash(&hash, network))
    }

    // -----------------------------------------------------------------------
    // Mutation / building
    // -----------------------------------------------------------------------

    /// Append a single opcode.
    ///
    /// Push opcodes that consume following bytes (0x01..=OP_PUSHDATA4) are
    /// rejected; use [`Script::append_data`] for those. OP_0 is allowed.
    pub fn append_opcode(&mut self, op: u8) -> Result<(), ScriptError> {
        if op != OP_0 && op <= OP_PUSHDATA4 {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op).to_string()));
        }
        let mut bytes = std::mem::take(&mut self.bytes);
        bytes.push(op);
        self.replace(bytes)
    }

    /// Append a minimally encoded push of `data`.
    pub fn append_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        self.append_data_with_width(data, PushWidth::Auto)
    }

    /// Append a push of `data` using the requested length-field width.
    pub fn append_data_with_width(&mut self, data: &[u8], width: PushWidth) -> Result<(), ScriptError> {
        let encoded = encode_push(data, width)?;
        let mut bytes = std::mem::take(&mut self.bytes);
        bytes.extend_from_slice(&encoded);
        self.replace(bytes)
    }

    /// Append all of `other`'s bytes.
    pub fn append_script(&mut self, other: &Script) -> Result<(), ScriptError> {
        let mut bytes = std::mem::take(&mut self.bytes);
        bytes.extend_from_slice(&other.bytes);
        self.replace(bytes)
    }

    /// Remove every push whose payload equals `data`. An empty `data` is a no-op.
    pub fn delete_occurrences_of_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        if data.is_empty() {
            return Ok(());
        }
        let bytes = self.collect_chunks(|chunk, buf| chunk.data(buf) != Some(data));
        self.replace(bytes)
    }

    /// Remove every chunk whose leading byte equals `op`.
    pub fn delete_occurrences_of_opcode(&mut self, op: u8) -> Result<(), ScriptError> {
        let bytes = self.collect_chunks(|chunk, _| chunk.op() != op);
        self.replace(bytes)
    }

    /// A new script holding chunks `index..` of this one.
    pub fn sub_script_from(&self, index: usize) -> Result<Script, ScriptError> {
        if index > self.chunks.len() {
            return Err(ScriptError::IndexOutOfRange);
        }
        let start = self.chunks.get(index).map_or(self.bytes.len(), |c| c.start());
        Script::from_bytes(&self.bytes[start..])
    }

    /// A new script holding chunks `..index` of this one.
    pub fn sub_script_to(&self, index: usize) -> Result<Script, ScriptError> {
        if index > self.chunks.len() {
            return Err(ScriptError::IndexOutOfRange);
        }
        let end = self.chunks.get(index).map_or(self.bytes.len(), |c| c.start());
        Script::from_bytes(&self.bytes[..end])
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Append an opcode chunk to a freshly built template; no caches exist yet.
    fn push_template_op(&mut self, op: u8) {
        self.chunks.push(ScriptChunk::opcode(self.bytes.len(), op));
        self.bytes.push(op);
    }

    fn push_template_hash(&mut self, hash: &[u8; 20]) {
        self.chunks.push(ScriptChunk::direct_push(self.bytes.len(), OP_DATA_20));
        self.bytes.push(OP_DATA_20);
        self.bytes.extend_from_slice(hash);
    }

    /// Swap in a new buffer, re-parse it and drop every cached value.
    fn replace(&mut self, bytes: Vec<u8>) -> Result<(), ScriptError> {
        self.chunks = parse_chunks(&bytes)?;
        self.bytes = bytes;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.rendered.take();
        self.multisig.take();
    }

    fn collect_chunks<F>(&self, keep: F) -> Vec<u8>
    where
        F: Fn(&ScriptChunk, &[u8]) -> bool,
    {
        self.chunks
            .iter()
            .filter(|chunk| keep(chunk, &self.bytes))
            .flat_map(|chunk| chunk.raw(&self.bytes).iter().copied())
            .collect()
    }

    fn is_push_of_len(&self, index: usize, len: usize) -> bool {
        self.chunks
            .get(index)
            .map_or(false, |c| c.is_push() && c.data_len() == len)
    }

    fn hash_at(&self, index: usize) -> Option<[u8; 20]> {
        self.chunks[index].data(&self.bytes)?.try_into().ok()
    }

    fn detect_multisig(&self) -> Option<MultisigRequirement> {
        let count = self.chunks.len();
        if count < 4 || self.opcode_at(-1) != Some(OP_CHECKMULTISIG) {
            return None;
        }
        let m = small_integer_from_opcode(self.opcode_at(0)?)?;
        let n = small_integer_from_opcode(self.opcode_at(-2)?)?;
        if m < 1 || n < m {
            return None;
        }
        let n = n as usize;
        if count != n + 3 {
            return None;
        }
        let public_keys = self.chunks[1..=n]
            .iter()
            .map(|chunk| chunk.to_owned_data(&self.bytes))
            .collect::<Option<Vec<_>>>()?;
        Some(MultisigRequirement {
            required: m as usize,
            public_keys,
        })
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Script {}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the Script type.
    //!
    //! Covers parse-or-fail construction, templates, classification,
    //! multisig detection and memo invalidation, mutation, rendering and
    //! the serde hex representation.

    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";
    const P2SH_HEX: &str = "a9149de5aeaff9c48431ba4dd6e8af73d51f38e451cb87";

    fn key(tag: u8) -> Vec<u8> {
        let mut k = vec![0x02];
        k.extend_from_slice(&[tag; 32]);
        k
    }

    // -----------------------------------------------------------------------
    // Construction & roundtrip tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid script");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.len(), 25);
        assert_eq!(script.chunks().len(), 5);
    }

    /// A truncated push rejects the whole script.
    #[test]
    fn test_from_bytes_truncated_fails() {
        assert!(matches!(Script::from_hex("76a914e2a6"), Err(ScriptError::DataTooSmall)));
        assert!(Script::from_hex("zz").is_err());
    }

    #[test]
    fn test_from_asm_roundtrip() {
        let asm = "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG";
        let script = Script::from_asm(asm).expect("valid ASM");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.to_asm(), asm);
        assert!(Script::from_asm("OP_DUP nothex").is_err());
        assert!(Script::from_asm("").expect("empty ASM").is_empty());
    }

    #[test]
    fn test_from_address_templates() {
        let pkh = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").expect("valid address");
        let script = Script::from_address(&pkh);
        assert!(script.is_p2pkh());
        assert!(script.is_standard());
        assert_eq!(script.public_key_hash().expect("p2pkh"), pkh.hash);

        let sh = Address::from_script_hash(&pkh.hash, Network::Mainnet);
        let script = Script::from_address(&sh);
        assert!(script.is_p2sh());
        assert!(script.is_standard());
        assert_eq!(script.to_asm(), "OP_HASH160 8fe80c75c9560e8b56ed64ea3c26e18d2c52211b OP_EQUAL");
    }

    #[test]
    fn test_from_address_chunks_match_parse() {
        let pkh = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").expect("valid address");
        let sh = Address::from_script_hash(&pkh.hash, Network::Mainnet);
        for address in [pkh, sh] {
            let built = Script::from_address(&address);
            let parsed = Script::from_bytes(built.as_bytes()).expect("template parses");
            assert_eq!(built.chunks(), parsed.chunks());
            assert_eq!(built, parsed);
        }
    }

    // -----------------------------------------------------------------------
    // Multisig construction and detection
    // -----------------------------------------------------------------------

    #[test]
    fn test_multisig_constructor_preconditions() {
        let keys = vec![key(1), key(2)];
        assert!(matches!(Script::multisig(&keys, 0), Err(ScriptError::InvalidMultisig(_))));
        assert!(matches!(Script::multisig(&keys, 3), Err(ScriptError::InvalidMultisig(_))));
        let too_many: Vec<Vec<u8>> = (0..17).map(key).collect();
        assert!(matches!(Script::multisig(&too_many, 1), Err(ScriptError::InvalidMultisig(_))));
        let empty: Vec<Vec<u8>> = Vec::new();
        assert!(Script::multisig(&empty, 1).is_err());
    }

    /// Every 1 <= m <= n <= 16 combination is detected with the exact keys.
    #[test]
    fn test_multisig_detection_all_sizes() {
        for n in 1..=16u8 {
            let keys: Vec<Vec<u8>> = (0..n).map(key).collect();
            for m in 1..=n as usize {
                let script = Script::multisig(&keys, m).expect("valid multisig");
                let req = script.multisig_requirement().expect("detected");
                assert_eq!(req.required, m);
                assert_eq!(req.public_keys, keys);
                assert_eq!(script.is_standard_multisig(), n <= 3);
            }
        }
    }

    #[test]
    fn test_multisig_detection_rejects_malformed() {
        let k = hex::encode(key(1));
        for asm in [
            format!("OP_2 {} OP_1 OP_CHECKMULTISIG", k),
            format!("OP_0 {} OP_1 OP_CHECKMULTISIG", k),
            format!("OP_1 {} OP_1 OP_CHECKSIG", k),
            format!("OP_1 {} {} OP_1 OP_CHECKMULTISIG", k, k),
            "OP_1 OP_DUP OP_1 OP_CHECKMULTISIG".to_string(),
            format!("OP_1 {} OP_1", k),
        ] {
            let script = Script::from_asm(&asm).expect("valid ASM");
            assert!(!script.is_multisig(), "{}", asm);
        }
    }

    /// OP_0 is an empty data push and counts as a key slot.
    #[test]
    fn test_multisig_detection_accepts_empty_push_key() {
        let script = Script::from_bytes(&[OP_1, OP_0, OP_1, OP_CHECKMULTISIG]).expect("valid");
        let req = script.multisig_requirement().expect("detected");
        assert_eq!(req.required, 1);
        assert_eq!(req.public_keys, vec![Vec::<u8>::new()]);
    }

    /// Mutations clear the memoized multisig result.
    #[test]
    fn test_multisig_memo_invalidated_by_mutation() {
        let keys = vec![key(1), key(2)];
        let mut script = Script::multisig(&keys, 1).expect("valid multisig");
        assert!(script.is_multisig());
        script.append_opcode(OP_DROP).expect("append");
        assert!(!script.is_multisig());
        script.delete_occurrences_of_opcode(OP_DROP).expect("delete");
        assert_eq!(script.multisig_required_signatures(), Some(1));
        assert_eq!(script.multisig_public_keys().map(|k| k.len()), Some(2));
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    #[test]
    fn test_classification_table() {
        let p2pkh = Script::from_hex(P2PKH_HEX).expect("valid");
        assert!(p2pkh.is_p2pkh() && !p2pkh.is_p2sh() && !p2pkh.is_p2pk());

        let p2sh = Script::from_hex(P2SH_HEX).expect("valid");
        assert!(p2sh.is_p2sh() && p2sh.ends_with_p2sh() && !p2sh.is_p2pkh());

        let p2pk = Script::from_asm(&format!("{} OP_CHECKSIG", hex::encode(key(7)))).expect("valid");
        assert!(p2pk.is_p2pk() && p2pk.is_standard());

        let one_byte = Script::from_asm("ff OP_CHECKSIG").expect("valid");
        assert!(!one_byte.is_p2pk());

        let op_return = Script::from_asm("OP_RETURN 68656c6c6f").expect("valid");
        assert!(!op_return.is_standard());
    }

    /// A P2SH hash pushed with OP_PUSHDATA1 is not a P2SH template.
    #[test]
    fn test_p2sh_requires_compact_push() {
        let mut script = Script::new();
        script.append_opcode(OP_HASH160).expect("append");
        script.append_data_with_width(&[0x11; 20], PushWidth::One).expect("append");
        script.append_opcode(OP_EQUAL).expect("append");
        assert!(!script.is_p2sh());
        assert!(!script.is_standard());
    }

    #[test]
    fn test_ends_with_p2sh() {
        let script = Script::from_hex(&format!("7551{}", P2SH_HEX)).expect("valid");
        assert!(script.ends_with_p2sh());
        assert!(!script.is_p2sh());
    }

    #[test]
    fn test_is_data_only() {
        assert!(Script::from_asm("OP_0 OP_1NEGATE OP_16 deadbeef").expect("valid").is_data_only());
        assert!(Script::new().is_data_only());
        assert!(!Script::from_asm("OP_1 OP_NOP").expect("valid").is_data_only());
    }

    #[test]
    fn test_standard_address() {
        let p2pkh = Script::from_hex(P2PKH_HEX).expect("valid");
        let addr = p2pkh.standard_address(Network::Mainnet).expect("address");
        assert_eq!(addr.address_type, AddressType::PubkeyHash);
        let p2sh = Script::from_hex(P2SH_HEX).expect("valid");
        let addr = p2sh.standard_address(Network::Testnet).expect("address");
        assert_eq!(addr.address_type, AddressType::ScriptHash);
        assert!(addr.to_string().starts_with('2'));
        assert!(Script::from_asm("OP_1").expect("valid").standard_address(Network::Mainnet).is_none());
    }

    #[test]
    fn test_public_key_hash_errors() {
        assert!(matches!(Script::new().public_key_hash(), Err(ScriptError::NotP2PKH)));
        let p2sh = Script::from_hex(P2SH_HEX).expect("valid");
        assert!(matches!(p2sh.public_key_hash(), Err(ScriptError::NotP2PKH)));
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    #[test]
    fn test_append_opcode_rejects_push_opcodes() {
        let mut script = Script::new();
        assert!(script.append_opcode(OP_PUSHDATA1).is_err());
        assert!(script.append_opcode(0x14).is_err());
        script.append_opcode(OP_0).expect("OP_0 is self-contained");
        assert_eq!(script.as_bytes(), &[OP_0]);
    }

    #[test]
    fn test_append_data_and_script() {
        let mut script = Script::new();
        script.append_data(&[0xaa; 80]).expect("append");
        assert_eq!(&script.as_bytes()[..2], &[OP_PUSHDATA1, 80]);
        let tail = Script::from_asm("OP_DROP OP_1").expect("valid");
        script.append_script(&tail).expect("append");
        assert_eq!(script.chunks().len(), 3);
        assert_eq!(script.opcode_at(-2), Some(OP_DROP));
        assert_eq!(script.pushed_data_at(0), Some(&[0xaa; 80][..]));
    }

    #[test]
    fn test_delete_occurrences() {
        let mut script = Script::from_asm("aabb OP_CODESEPARATOR aabb OP_DUP ccdd OP_CODESEPARATOR").expect("valid");
        script.delete_occurrences_of_data(&[0xaa, 0xbb]).expect("delete");
        assert_eq!(script.to_asm(), "OP_CODESEPARATOR OP_DUP ccdd OP_CODESEPARATOR");
        script.delete_occurrences_of_opcode(OP_CODESEPARATOR).expect("delete");
        assert_eq!(script.to_asm(), "OP_DUP ccdd");
        script.delete_occurrences_of_data(&[]).expect("no-op");
        assert_eq!(script.to_asm(), "OP_DUP ccdd");
    }

    #[test]
    fn test_sub_scripts() {
        let script = Script::from_asm("OP_1 aabb OP_CODESEPARATOR OP_CHECKSIG").expect("valid");
        assert_eq!(script.sub_script_from(2).expect("sub").to_asm(), "OP_CODESEPARATOR OP_CHECKSIG");
        assert_eq!(script.sub_script_to(2).expect("sub").to_asm(), "OP_1 aabb");
        assert!(script.sub_script_from(4).expect("sub").is_empty());
        assert_eq!(script.sub_script_to(4).expect("sub"), script);
        assert!(script.sub_script_from(5).is_err());
    }

    // -----------------------------------------------------------------------
    // Rendering, Display, serde
    // -----------------------------------------------------------------------

    #[test]
    fn test_debug_string() {
        let mut script = Script::from_asm("OP_0 OP_3 68656c6c6f 00ff").expect("valid");
        assert_eq!(script.debug_string(), "OP_0 OP_3 'hello' [00ff]");
        script.append_data_with_width(b"hi", PushWidth::Two).expect("append");
        assert_eq!(script.debug_string(), "OP_0 OP_3 'hello' [00ff] 2:'hi'");
    }

    #[test]
    fn test_display_and_debug() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid");
        assert_eq!(format!("{}", script), P2PKH_HEX);
        assert_eq!(format!("{:?}", script), format!("Script({})", P2PKH_HEX));
    }

    #[test]
    fn test_serde_roundtrip() {
        let script = Script::from_asm("OP_2 OP_2 OP_ADD OP_4 OP_EQUALVERIFY").expect("valid ASM");
        let json_str = serde_json::to_string(&script).expect("should serialize");
        assert_eq!(json_str, r#""5252935488""#);
        let back: Script = serde_json::from_str(&json_str).expect("should deserialize");
        assert_eq!(back, script);
        assert!(serde_json::from_str::<Script>(r#""4c""#).is_err());
    }
}
