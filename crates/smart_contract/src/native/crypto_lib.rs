//! CryptoLib native contract implementation.
//!
//! Exposes the cryptographic primitives contracts reach via `System.Contract.Call`:
//! RIPEMD160/SHA256 hashing, ECDSA signature verification over the secp256r1 and
//! secp256k1 named curves, and BLS12-381 point serialization, equality, addition,
//! scalar multiplication and pairing.

use crate::application_engine::ApplicationEngine;
use crate::native::{NativeContract, NativeMethod};
use crate::{Error, Result};
use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
use group::Curve;
use neo_core::UInt160;
use neo_cryptography::ecdsa::ECDsa;
use neo_cryptography::hash;

const G1_COMPRESSED_SIZE: usize = 48;
const G2_COMPRESSED_SIZE: usize = 96;
const GT_SIZE: usize = 576;
const SCALAR_SIZE: usize = 32;

/// Curve selector for `verifyWithECDsa`, matching Neo's named curve identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamedCurve {
    Secp256r1,
    Secp256k1,
}

impl NamedCurve {
    fn from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(NamedCurve::Secp256r1),
            1 => Ok(NamedCurve::Secp256k1),
            other => Err(Error::InvalidArguments(format!(
                "unknown named curve identifier {other}"
            ))),
        }
    }
}

/// The CryptoLib native contract.
pub struct CryptoLib {
    hash: UInt160,
    methods: Vec<NativeMethod>,
}

impl CryptoLib {
    /// Creates a new CryptoLib contract.
    pub fn new() -> Self {
        let hash = UInt160::from_bytes(&[
            0x72, 0x6c, 0xb6, 0xe0, 0xcd, 0x8c, 0x99, 0x83, 0x91, 0x78, 0xee, 0xc0, 0x85, 0xfd,
            0x4f, 0x2e, 0x4b, 0xaf, 0x01, 0x25,
        ])
        .expect("Valid CryptoLib contract hash");

        let methods = vec![
            NativeMethod::safe("ripemd160".to_string(), 1 << 15),
            NativeMethod::safe("sha256".to_string(), 1 << 15),
            NativeMethod::safe("verifyWithECDsa".to_string(), 1 << 15),
            NativeMethod::safe("bls12381Serialize".to_string(), 1 << 19),
            NativeMethod::safe("bls12381Deserialize".to_string(), 1 << 19),
            NativeMethod::safe("bls12381Equal".to_string(), 1 << 8),
            NativeMethod::safe("bls12381Add".to_string(), 1 << 19),
            NativeMethod::safe("bls12381Mul".to_string(), 1 << 21),
            NativeMethod::safe("bls12381Pairing".to_string(), 1 << 23),
        ];

        Self { hash, methods }
    }

    fn ripemd160(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let data = args
            .first()
            .ok_or_else(|| Error::InvalidArguments("ripemd160 requires 1 argument".to_string()))?;
        Ok(hash::ripemd160(data).to_vec())
    }

    fn sha256(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let data = args
            .first()
            .ok_or_else(|| Error::InvalidArguments("sha256 requires 1 argument".to_string()))?;
        Ok(hash::sha256(data).to_vec())
    }

    fn verify_with_ecdsa(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        if args.len() < 4 {
            return Err(Error::InvalidArguments(
                "verifyWithECDsa requires message, pubkey, signature and curve".to_string(),
            ));
        }
        let message = &args[0];
        let pubkey = &args[1];
        let signature = &args[2];
        let curve = NamedCurve::from_byte(*args[3].first().unwrap_or(&0))?;

        let verified = match curve {
            NamedCurve::Secp256r1 => ECDsa::verify_signature_secp256r1(message, signature, pubkey),
            NamedCurve::Secp256k1 => ECDsa::verify_signature_secp256k1(message, signature, pubkey),
        }
        .unwrap_or(false);

        Ok(vec![verified as u8])
    }

    fn parse_g1(bytes: &[u8]) -> Result<G1Affine> {
        let array: [u8; G1_COMPRESSED_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidArguments("expected a 48-byte G1 point".to_string()))?;
        let point = G1Affine::from_compressed(&array);
        if bool::from(point.is_some()) {
            Ok(point.unwrap())
        } else {
            Err(Error::InvalidArguments("invalid G1 point encoding".to_string()))
        }
    }

    fn parse_g2(bytes: &[u8]) -> Result<G2Affine> {
        let array: [u8; G2_COMPRESSED_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidArguments("expected a 96-byte G2 point".to_string()))?;
        let point = G2Affine::from_compressed(&array);
        if bool::from(point.is_some()) {
            Ok(point.unwrap())
        } else {
            Err(Error::InvalidArguments("invalid G2 point encoding".to_string()))
        }
    }

    /// Round-trips a point through its canonical compressed encoding, validating it.
    /// Used for both `bls12381Serialize` and `bls12381Deserialize`: points stay
    /// compressed on the stack, so both operations reduce to the same canonicalization.
    fn bls12381_canonicalize(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let bytes = args.first().ok_or_else(|| {
            Error::InvalidArguments("bls12381 point argument required".to_string())
        })?;
        match bytes.len() {
            G1_COMPRESSED_SIZE => Ok(Self::parse_g1(bytes)?.to_compressed().to_vec()),
            G2_COMPRESSED_SIZE => Ok(Self::parse_g2(bytes)?.to_compressed().to_vec()),
            GT_SIZE => {
                let array: [u8; GT_SIZE] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::InvalidArguments("invalid GT point size".to_string()))?;
                let gt = Gt::from_bytes(&array);
                if bool::from(gt.is_some()) {
                    Ok(gt.unwrap().to_bytes().to_vec())
                } else {
                    Err(Error::InvalidArguments("invalid GT point encoding".to_string()))
                }
            }
            other => Err(Error::InvalidArguments(format!(
                "unsupported BLS12-381 point size {other}"
            ))),
        }
    }

    fn bls12381_equal(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        if args.len() < 2 {
            return Err(Error::InvalidArguments(
                "bls12381Equal requires 2 arguments".to_string(),
            ));
        }
        let left = self.bls12381_canonicalize(&args[0..1])?;
        let right = self.bls12381_canonicalize(&args[1..2])?;
        Ok(vec![(left == right) as u8])
    }

    fn bls12381_add(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        if args.len() < 2 {
            return Err(Error::InvalidArguments(
                "bls12381Add requires 2 arguments".to_string(),
            ));
        }
        match (args[0].len(), args[1].len()) {
            (G1_COMPRESSED_SIZE, G1_COMPRESSED_SIZE) => {
                let a = G1Projective::from(Self::parse_g1(&args[0])?);
                let b = G1Projective::from(Self::parse_g1(&args[1])?);
                Ok((a + b).to_affine().to_compressed().to_vec())
            }
            (G2_COMPRESSED_SIZE, G2_COMPRESSED_SIZE) => {
                let a = G2Projective::from(Self::parse_g2(&args[0])?);
                let b = G2Projective::from(Self::parse_g2(&args[1])?);
                Ok((a + b).to_affine().to_compressed().to_vec())
            }
            _ => Err(Error::InvalidArguments(
                "bls12381Add requires both points on the same curve".to_string(),
            )),
        }
    }

    fn bls12381_mul(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        if args.len() < 2 {
            return Err(Error::InvalidArguments(
                "bls12381Mul requires a point and a scalar".to_string(),
            ));
        }
        let scalar_bytes: [u8; SCALAR_SIZE] = args[1].as_slice().try_into().map_err(|_| {
            Error::InvalidArguments("bls12381Mul scalar must be 32 bytes".to_string())
        })?;
        let scalar = Scalar::from_bytes(&scalar_bytes);
        if !bool::from(scalar.is_some()) {
            return Err(Error::InvalidArguments("invalid scalar value".to_string()));
        }
        let mut scalar = scalar.unwrap();
        if args.get(2).and_then(|v| v.first()).copied().unwrap_or(0) != 0 {
            scalar = -scalar;
        }

        match args[0].len() {
            G1_COMPRESSED_SIZE => {
                let point = G1Projective::from(Self::parse_g1(&args[0])?);
                Ok((point * scalar).to_affine().to_compressed().to_vec())
            }
            G2_COMPRESSED_SIZE => {
                let point = G2Projective::from(Self::parse_g2(&args[0])?);
                Ok((point * scalar).to_affine().to_compressed().to_vec())
            }
            other => Err(Error::InvalidArguments(format!(
                "unsupported BLS12-381 point size {other}"
            ))),
        }
    }

    fn bls12381_pairing(&self, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        if args.len() < 2 {
            return Err(Error::InvalidArguments(
                "bls12381Pairing requires a G1 and a G2 point".to_string(),
            ));
        }
        let g1 = Self::parse_g1(&args[0])?;
        let g2 = Self::parse_g2(&args[1])?;
        Ok(pairing(&g1, &g2).to_bytes().to_vec())
    }

    /// Invokes a method on the CryptoLib contract.
    pub fn invoke_method(
        &self,
        _engine: &mut ApplicationEngine,
        method: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        match method {
            "ripemd160" => self.ripemd160(args),
            "sha256" => self.sha256(args),
            "verifyWithECDsa" => self.verify_with_ecdsa(args),
            "bls12381Serialize" | "bls12381Deserialize" => self.bls12381_canonicalize(args),
            "bls12381Equal" => self.bls12381_equal(args),
            "bls12381Add" => self.bls12381_add(args),
            "bls12381Mul" => self.bls12381_mul(args),
            "bls12381Pairing" => self.bls12381_pairing(args),
            other => Err(Error::NativeContractError(format!(
                "unknown CryptoLib method: {other}"
            ))),
        }
    }
}

impl NativeContract for CryptoLib {
    fn hash(&self) -> UInt160 {
        self.hash
    }

    fn name(&self) -> &str {
        "CryptoLib"
    }

    fn methods(&self) -> &[NativeMethod] {
        &self.methods
    }

    fn invoke(
        &self,
        engine: &mut ApplicationEngine,
        method: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        self.invoke_method(engine, method, args)
    }
}

impl Default for CryptoLib {
    fn default() -> Self {
        Self::new()
    }
}
