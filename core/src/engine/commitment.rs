// Copyright (c) 2023-2024 The Ledger MW Project

//! Commitment and bulletproof component handlers
//!
//! Both commands share the output request body, a little-endian value, a
//! serialized identifier and a switch type byte. Bulletproofs exceed the
//! response capacity so they are served in chunks; the proof is
//! deterministic per request and recomputed for each chunk rather than
//! held between exchanges.

use encdec::Decode;
use zeroize::Zeroize;

use ledger_mw_apdu::{
    commitment::{CommitmentReq, CommitmentResp},
    proof::{BulletproofComponentsResp, BULLETPROOF_CHUNK_SIZE},
    Request, Response,
};

use crate::consts::{BULLETPROOF_SIZE, IDENTIFIER_SIZE};
use crate::engine::{
    append_apdu,
    mw::{self, Identifier, SwitchType},
    Driver, Engine, Error,
};

/// Validated output request shared by the commitment commands
struct OutputRequest {
    value: u64,
    identifier: Identifier,
    switch_type: SwitchType,
}

/// Parse and validate an output request body
fn parse_output_request(data: &[u8]) -> Result<OutputRequest, Error> {
    if data.len() != 8 + IDENTIFIER_SIZE + 1 {
        return Err(Error::MalformedRequest);
    }

    let (req, _) = CommitmentReq::decode(data).map_err(|_| Error::MalformedRequest)?;

    if req.value == 0 {
        return Err(Error::InvalidParameters);
    }

    let identifier = Identifier::from_bytes(&req.identifier)?;
    let switch_type =
        SwitchType::try_from(req.switch_type).map_err(|_| Error::InvalidParameters)?;

    Ok(OutputRequest {
        value: req.value,
        identifier,
        switch_type,
    })
}

impl<DRV: Driver> Engine<DRV> {
    /// Fetch the Pedersen commitment for a value and output identifier
    #[cfg_attr(feature = "noinline", inline(never))]
    pub(crate) fn get_commitment(
        &mut self,
        req: &Request,
        response: &mut Response,
    ) -> Result<(), Error> {
        self.require_unlocked()?;

        if req.first_parameter != 0 || req.second_parameter != 0 {
            return Err(Error::InvalidParameters);
        }

        let output = parse_output_request(req.data)?;

        let mut seed = self.driver().wallet_seed();
        let commitment = mw::commit_value(
            seed.as_ref(),
            output.value,
            &output.identifier,
            output.switch_type,
        );
        seed.zeroize();
        let commitment = commitment?;

        append_apdu(response, &CommitmentResp::new(commitment.0))
    }

    /// Fetch one chunk of the bulletproof for a value and output identifier
    ///
    /// `P2` selects the chunk; each response carries the total proof length
    /// so the host knows when reassembly is complete.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub(crate) fn get_bulletproof_components(
        &mut self,
        req: &Request,
        response: &mut Response,
    ) -> Result<(), Error> {
        self.require_unlocked()?;

        if req.first_parameter != 0 {
            return Err(Error::InvalidParameters);
        }
        let chunk_index = req.second_parameter as usize;

        let output = parse_output_request(req.data)?;

        let mut seed = self.driver().wallet_seed();
        let r = self.build_bulletproof(seed.as_ref(), &output);
        seed.zeroize();
        let (mut proof, length) = r?;

        // Resolve the requested chunk against the actual proof length
        let offset = chunk_index * BULLETPROOF_CHUNK_SIZE;
        if offset >= length {
            return Err(Error::InvalidParameters);
        }
        let end = (offset + BULLETPROOF_CHUNK_SIZE).min(length);

        let r = append_apdu(
            response,
            &BulletproofComponentsResp::new(length as u16, &proof[offset..end]),
        );

        proof.zeroize();

        r
    }

    /// Derive the nonces and blinding factor for an output and run the
    /// platform prover
    fn build_bulletproof(
        &self,
        seed: &[u8],
        output: &OutputRequest,
    ) -> Result<([u8; BULLETPROOF_SIZE], usize), Error> {
        let mut blinding =
            mw::derive_blinding_factor(seed, output.value, &output.identifier, output.switch_type)?;

        let commitment = match mw::commit(output.value, &blinding) {
            Ok(c) => c,
            Err(e) => {
                blinding.zeroize();
                return Err(e);
            }
        };

        let rewind = mw::rewind_nonce(seed, &commitment);
        let private = mw::private_nonce(seed, &commitment);
        let message = mw::proof_message(&output.identifier, output.switch_type);

        let mut proof = [0u8; BULLETPROOF_SIZE];
        let r = match (rewind, private) {
            (Ok(rewind), Ok(mut private)) => {
                let r = mw::calculate_bulletproof(
                    self.driver(),
                    output.value,
                    &blinding,
                    &rewind,
                    &private,
                    &message,
                    &mut proof,
                );
                private.zeroize();
                r
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        blinding.zeroize();

        let length = r?;

        Ok((proof, length))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::testing::{setup, TestDriver};
    use crate::engine::Driver;

    use ledger_mw_apdu::{Instruction, MW_APDU_CLA};

    fn output_body(value: u64, depth: u8, switch_type: u8) -> [u8; 26] {
        // Depth byte then big-endian path indices, here [0, 1, 2]
        let mut identifier = [0u8; IDENTIFIER_SIZE];
        identifier[0] = depth;
        identifier[8] = 1;
        identifier[12] = 2;

        let mut body = [0u8; 26];
        body[..8].copy_from_slice(&value.to_le_bytes());
        body[8..][..IDENTIFIER_SIZE].copy_from_slice(&identifier);
        body[25] = switch_type;
        body
    }

    fn command_frame(instruction: Instruction, p2: u8, data: &[u8]) -> ([u8; 64], usize) {
        let mut buff = [0u8; 64];
        let n =
            Request::encode_frame(MW_APDU_CLA, instruction as u8, 0, p2, data, &mut buff).unwrap();
        (buff, n)
    }

    #[test]
    fn requires_unlock() {
        let mut engine = Engine::new(TestDriver::new());
        let mut response = Response::new();

        let body = output_body(100, 3, 1);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body);

        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::DeviceLocked
        );
        assert!(response.is_empty());
    }

    #[test]
    fn commitment_command() {
        setup();

        let drv = TestDriver::new();
        let seed = drv.seed();
        let mut engine = Engine::new(drv);
        engine.unlock();

        let body = output_body(1_000_000, 3, SwitchType::Regular as u8);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body);

        let mut response = Response::new();
        engine.handle(&buff[..n], &mut response).unwrap();
        assert_eq!(response.len(), 33);

        // Matches a direct derivation and is a valid commitment
        let identifier = Identifier::new(&[0, 1, 2]).unwrap();
        let expected = mw::commit_value(&seed, 1_000_000, &identifier, SwitchType::Regular).unwrap();
        assert_eq!(response.as_bytes(), expected.as_bytes());
        assert!(mw::commitment_is_valid(expected.as_bytes()));
    }

    #[test]
    fn commitment_rejects_invalid_requests() {
        let mut engine = Engine::new(TestDriver::new());
        engine.unlock();

        let mut response = Response::new();

        // Zero value
        let body = output_body(0, 3, 1);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body);
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );

        // Excess identifier depth
        let body = output_body(10, 5, 1);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body);
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );

        // Unknown switch type
        let body = output_body(10, 3, 7);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body);
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );

        // Truncated body
        let body = output_body(10, 3, 1);
        let (buff, n) = command_frame(Instruction::GetCommitment, 0, &body[..20]);
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::MalformedRequest
        );

        assert!(response.is_empty());
    }

    #[test]
    fn bulletproof_chunks_reassemble() {
        let drv = TestDriver::new();
        let seed = drv.seed();
        let mut engine = Engine::new(TestDriver::with_seed(seed));
        engine.unlock();

        let body = output_body(1_000_000, 3, SwitchType::Regular as u8);

        let mut assembled = [0u8; BULLETPROOF_SIZE];
        let mut total = usize::MAX;
        let mut offset = 0usize;
        let mut chunk_index = 0u8;

        while offset < total {
            let (buff, n) =
                command_frame(Instruction::GetBulletproofComponents, chunk_index, &body);

            let mut response = Response::new();
            engine.handle(&buff[..n], &mut response).unwrap();

            let bytes = response.as_bytes();
            total = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;

            let chunk = &bytes[2..];
            assembled[offset..offset + chunk.len()].copy_from_slice(chunk);
            offset += chunk.len();
            chunk_index += 1;
        }

        assert_eq!(total, BULLETPROOF_SIZE);
        assert_eq!(offset, total);

        // Reassembly matches a direct prover run
        let identifier = Identifier::new(&[0, 1, 2]).unwrap();
        let blinding =
            mw::derive_blinding_factor(&seed, 1_000_000, &identifier, SwitchType::Regular).unwrap();
        let commitment = mw::commit(1_000_000, &blinding).unwrap();
        let rewind = mw::rewind_nonce(&seed, &commitment).unwrap();
        let private = mw::private_nonce(&seed, &commitment).unwrap();
        let message = mw::proof_message(&identifier, SwitchType::Regular);

        let mut expected = [0u8; BULLETPROOF_SIZE];
        let m = drv
            .range_proof(1_000_000, &blinding, &rewind, &private, &message, &mut expected)
            .unwrap();

        assert_eq!(m, total);
        assert_eq!(assembled[..total], expected[..m]);
    }

    #[test]
    fn bulletproof_rejects_chunk_past_end() {
        let mut engine = Engine::new(TestDriver::new());
        engine.unlock();

        let body = output_body(1_000_000, 3, SwitchType::Regular as u8);

        // 675-byte proof spans chunks 0..=3
        let (buff, n) = command_frame(Instruction::GetBulletproofComponents, 4, &body);

        let mut response = Response::new();
        assert_eq!(
            engine.handle(&buff[..n], &mut response).unwrap_err(),
            Error::InvalidParameters
        );
        assert!(response.is_empty());
    }
}
