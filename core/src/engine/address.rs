// Copyright (c) 2023-2024 The Ledger MW Project

//! Address public key handler

use byteorder::{ByteOrder, LittleEndian};
use zeroize::Zeroize;

use ledger_mw_apdu::{
    address::{AddressPublicKeyResp, AddressType},
    Request, Response,
};

use crate::engine::{append_apdu, Driver, Engine, Error};
use crate::keys::{self, Curve};

impl<DRV: Driver> Engine<DRV> {
    /// Fetch the public key for an address scheme and derivation index
    ///
    /// `P1` selects the scheme, the body carries the little-endian index.
    /// MQS addresses use a secp256k1 key, Tor and Slatepack addresses share
    /// the Ed25519 address key (their public encodings differ host-side).
    #[cfg_attr(feature = "noinline", inline(never))]
    pub(crate) fn get_address_public_key(
        &mut self,
        req: &Request,
        response: &mut Response,
    ) -> Result<(), Error> {
        self.require_unlocked()?;

        let address_type =
            AddressType::try_from(req.first_parameter).map_err(|_| Error::InvalidParameters)?;
        if req.second_parameter != 0 {
            return Err(Error::InvalidParameters);
        }
        if req.data.len() != 4 {
            return Err(Error::MalformedRequest);
        }

        let index = LittleEndian::read_u32(req.data);

        let curve = match address_type {
            AddressType::Mqs => Curve::Secp256k1,
            AddressType::Tor | AddressType::Slatepack => Curve::Ed25519,
        };

        let mut seed = self.driver().wallet_seed();
        let key = keys::address_private_key(seed.as_ref(), index, curve);
        seed.zeroize();
        let mut key = key?;

        let public = keys::public_key(&key);
        key.zeroize();
        let public = public?;

        append_apdu(response, &AddressPublicKeyResp::new(public.as_bytes()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::{COMPRESSED_PUBLIC_KEY_SIZE, ED25519_PUBLIC_KEY_SIZE};
    use crate::engine::testing::{setup, TestDriver};

    use ledger_mw_apdu::{Instruction, MW_APDU_CLA};

    fn address_frame(p1: u8, p2: u8, data: &[u8]) -> ([u8; 64], usize) {
        let mut buff = [0u8; 64];
        let n = Request::encode_frame(
            MW_APDU_CLA,
            Instruction::GetAddressPublicKey as u8,
            p1,
            p2,
            data,
            &mut buff,
        )
        .unwrap();
        (buff, n)
    }

    #[test]
    fn requires_unlock() {
        let mut engine = Engine::new(TestDriver::new());
        let mut response = Response::new();

        let (buff, n) = address_frame(AddressType::Mqs as u8, 0, &0u32.to_le_bytes());

        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::DeviceLocked
        );
        assert!(response.is_empty());
    }

    #[test]
    fn mqs_address_public_key() {
        setup();

        let drv = TestDriver::new();
        let seed = drv.seed();
        let mut engine = Engine::new(drv);
        engine.unlock();

        let mut response = Response::new();
        let (buff, n) = address_frame(AddressType::Mqs as u8, 0, &3u32.to_le_bytes());
        engine.handle(&buff[..n], &mut response).unwrap();

        assert_eq!(response.len(), COMPRESSED_PUBLIC_KEY_SIZE);

        let key = keys::address_private_key(&seed, 3, Curve::Secp256k1).unwrap();
        let expected = keys::public_key(&key).unwrap();
        assert_eq!(response.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn tor_and_slatepack_share_the_ed25519_key() {
        let drv = TestDriver::new();
        let seed = drv.seed();
        let mut engine = Engine::new(drv);
        engine.unlock();

        let mut tor = Response::new();
        let (buff, n) = address_frame(AddressType::Tor as u8, 0, &0u32.to_le_bytes());
        engine.handle(&buff[..n], &mut tor).unwrap();
        assert_eq!(tor.len(), ED25519_PUBLIC_KEY_SIZE);

        let mut slatepack = Response::new();
        let (buff, n) = address_frame(AddressType::Slatepack as u8, 0, &0u32.to_le_bytes());
        engine.handle(&buff[..n], &mut slatepack).unwrap();

        assert_eq!(tor.as_bytes(), slatepack.as_bytes());

        let key = keys::address_private_key(&seed, 0, Curve::Ed25519).unwrap();
        let expected = keys::public_key(&key).unwrap();
        assert_eq!(tor.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut engine = Engine::new(TestDriver::new());
        engine.unlock();

        let mut response = Response::new();

        // Unknown address type
        let (buff, n) = address_frame(0x09, 0, &0u32.to_le_bytes());
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );

        // Non-zero P2
        let (buff, n) = address_frame(AddressType::Tor as u8, 1, &0u32.to_le_bytes());
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );

        // Short index
        let (buff, n) = address_frame(AddressType::Tor as u8, 0, &[0u8; 3]);
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::MalformedRequest
        );

        assert!(response.is_empty());
    }
}
