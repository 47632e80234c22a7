//! LE legacy pairing, responder role
//!
//! One [`SmpResponder`] is bound to one link. The link layer feeds it events
//! one at a time, either through the typed handlers or through
//! [`SmpResponder::handle_event`], and each event is processed to completion
//! before the next.
//!
//! ```text
//! Idle --Pairing Request--> AwaitingConfirm --Pairing Confirm--> AwaitingRandom
//!                                                                  |
//!                                      confirm matches: Completed <+> mismatch: Failed
//! ```
//!
//! A Pairing Failed from the peer moves any state to `Failed`. PDUs that do not
//! fit the current state, arrive on another channel or cannot be decoded are
//! dropped without changing anything.

use super::config::{KeyIdentityPolicy, SmpConfig};
use super::constants::*;
use super::crypto::CryptoProvider;
use super::keys::{KeyRegistrar, LongTermKey};
use super::link::{LinkAdapter, LinkEvent};
use super::pdu::*;
use super::types::*;
use crate::error::{SmpError, SmpResult};
use crate::gap::DeviceAddress;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

/// Type for SMP event callback
pub type SmpEventCallback = Box<dyn FnMut(SmpEvent) + Send>;

/// Pairing Request as received and the Pairing Response sent for it
#[derive(Clone, Copy)]
struct FeatureExchange {
    preq: [u8; SMP_PAIRING_FEATURES_LEN],
    pres: [u8; SMP_PAIRING_FEATURES_LEN],
}

/// Key material awaiting distribution over the encrypted link
struct KeyBundle {
    stk: Zeroizing<[u8; 16]>,
    ediv: u16,
    rand: Zeroizing<[u8; 8]>,
}

/// Security Manager responder for a single link
pub struct SmpResponder {
    /// Remote peer, the pairing initiator
    initiator: DeviceAddress,
    /// Local device
    responder: DeviceAddress,
    config: SmpConfig,
    state: PairingState,

    exchange: Option<FeatureExchange>,
    remote_confirm: Option<[u8; 16]>,
    local_random: Option<Zeroizing<[u8; 16]>>,
    keys: Option<KeyBundle>,

    /// Detached once the link closes
    link: Option<Box<dyn LinkAdapter>>,
    crypto: Box<dyn CryptoProvider>,
    registrar: Box<dyn KeyRegistrar>,
    event_callback: Option<SmpEventCallback>,
}

impl SmpResponder {
    /// Bind a responder to a link between `local` and the initiating `remote`
    pub fn new(
        local: DeviceAddress,
        remote: DeviceAddress,
        config: SmpConfig,
        link: impl LinkAdapter + 'static,
        crypto: impl CryptoProvider + 'static,
        registrar: impl KeyRegistrar + 'static,
    ) -> Self {
        Self {
            initiator: remote,
            responder: local,
            config,
            state: PairingState::Idle,
            exchange: None,
            remote_confirm: None,
            local_random: None,
            keys: None,
            link: Some(Box::new(link)),
            crypto: Box::new(crypto),
            registrar: Box::new(registrar),
            event_callback: None,
        }
    }

    /// Set the event callback
    pub fn set_event_callback<F>(&mut self, callback: F)
    where
        F: FnMut(SmpEvent) + Send + 'static,
    {
        self.event_callback = Some(Box::new(callback));
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn initiator(&self) -> DeviceAddress {
        self.initiator
    }

    pub fn responder(&self) -> DeviceAddress {
        self.responder
    }

    pub fn config(&self) -> &SmpConfig {
        &self.config
    }

    /// Whether a key bundle is waiting for the link to become encrypted
    pub fn has_pending_keys(&self) -> bool {
        self.keys.is_some()
    }

    /// Dispatch one link event to its handler
    pub fn handle_event(&mut self, event: LinkEvent) -> SmpResult<()> {
        match event {
            LinkEvent::Data { channel_id, pdu } => self.on_data(channel_id, &pdu),
            LinkEvent::EncryptionChanged(encrypted) => self.on_encryption_changed(encrypted),
            LinkEvent::NegotiationRejected => self.on_negotiation_rejected(),
            LinkEvent::Closed => self.on_link_closed(),
            LinkEvent::SetTemporaryKey(tk) => return self.set_temporary_key(tk),
            LinkEvent::SetPairingFeatures(features) => return self.set_pairing_features(features),
        }
        Ok(())
    }

    /// Handle an L2CAP frame
    pub fn on_data(&mut self, channel_id: u16, data: &[u8]) {
        if self.state == PairingState::Closed {
            return;
        }

        if channel_id != SMP_CID {
            debug!(peer = %self.initiator, channel_id, "ignoring frame outside the SMP channel");
            return;
        }

        let pdu = match SmpPdu::parse(data) {
            Ok(pdu) => pdu,
            Err(err) => {
                debug!(peer = %self.initiator, %err, "dropping malformed SMP PDU");
                return;
            }
        };

        match (self.state, pdu) {
            (PairingState::Idle, SmpPdu::PairingRequest(_)) => self.handle_pairing_request(data),
            (PairingState::AwaitingConfirm, SmpPdu::PairingConfirm(confirm)) => {
                self.handle_pairing_confirm(confirm)
            }
            (PairingState::AwaitingRandom, SmpPdu::PairingRandom(random)) => {
                self.handle_pairing_random(random)
            }
            (_, SmpPdu::PairingFailed(failed)) => self.handle_pairing_failed(failed),
            (state, pdu) => {
                debug!(
                    peer = %self.initiator,
                    %state,
                    opcode = pdu.opcode(),
                    "dropping SMP PDU unexpected in this state"
                );
            }
        }
    }

    /// Handle a change of link encryption
    pub fn on_encryption_changed(&mut self, encrypted: bool) {
        if self.state == PairingState::Closed || !encrypted {
            return;
        }

        let Some(keys) = self.keys.take() else {
            debug!(peer = %self.initiator, "link encrypted with no key bundle to distribute");
            return;
        };

        self.send(EncryptionInformation::new(*keys.stk).serialize());
        self.send(MasterIdentification::new(keys.ediv, *keys.rand).serialize());

        info!(peer = %self.initiator, "distributed encryption key");
        self.notify(SmpEvent::KeysDistributed {
            address: self.initiator,
        });
    }

    /// Handle a negative reply to the controller's key request
    pub fn on_negotiation_rejected(&mut self) {
        if self.state == PairingState::Closed {
            return;
        }

        self.send(PairingFailed::new(FailureReason::UnspecifiedReason).serialize());
        self.fail(FailureReason::UnspecifiedReason, false);
    }

    /// Handle link teardown; the responder ignores every later event
    pub fn on_link_closed(&mut self) {
        if self.state == PairingState::Closed {
            return;
        }

        debug!(peer = %self.initiator, state = %self.state, "link closed");
        self.link = None;
        self.discard_attempt();
        self.keys = None;
        self.state = PairingState::Closed;
    }

    /// Override the temporary key
    ///
    /// Accepted until the local confirm value has been computed.
    pub fn set_temporary_key(&mut self, temporary_key: [u8; 16]) -> SmpResult<()> {
        match self.state {
            PairingState::Idle | PairingState::AwaitingConfirm => {
                self.config.temporary_key = temporary_key;
                Ok(())
            }
            PairingState::Closed => Err(SmpError::LinkClosed),
            state => {
                warn!(peer = %self.initiator, %state, "temporary key arrived too late");
                Err(SmpError::ConfigurationTooLate)
            }
        }
    }

    /// Override IO capability, OOB flag and authentication requirements
    ///
    /// Accepted only before the Pairing Response has been sent.
    pub fn set_pairing_features(&mut self, features: PairingFeatures) -> SmpResult<()> {
        match self.state {
            PairingState::Idle => {
                self.config.features = features;
                Ok(())
            }
            PairingState::Closed => Err(SmpError::LinkClosed),
            state => {
                warn!(peer = %self.initiator, %state, "pairing features arrived too late");
                Err(SmpError::ConfigurationTooLate)
            }
        }
    }

    fn handle_pairing_request(&mut self, data: &[u8]) {
        let mut preq = [0u8; SMP_PAIRING_FEATURES_LEN];
        preq.copy_from_slice(&data[..SMP_PAIRING_FEATURES_LEN]);

        // Initiator distributes nothing; responder distributes its encryption key only
        let pres = PairingResponse::from_features(
            &self.config.features,
            SMP_MAX_ENCRYPTION_KEY_SIZE,
            KeyDistribution::empty(),
            KeyDistribution::ENCRYPTION_KEY,
        )
        .to_bytes(false);

        self.exchange = Some(FeatureExchange { preq, pres });
        self.send(pres.to_vec());
        self.transition(PairingState::AwaitingConfirm);
    }

    fn handle_pairing_confirm(&mut self, confirm: PairingConfirm) {
        let Some(exchange) = self.exchange else {
            return;
        };

        self.remote_confirm = Some(confirm.confirm_value);

        let local_random = Zeroizing::new(self.crypto.random_128());
        let local_confirm = self.confirm_value(&local_random, &exchange);
        self.local_random = Some(local_random);

        self.send(PairingConfirm::new(local_confirm).serialize());
        self.transition(PairingState::AwaitingRandom);
    }

    fn handle_pairing_random(&mut self, random: PairingRandom) {
        let (Some(exchange), Some(remote_confirm)) = (self.exchange, self.remote_confirm) else {
            return;
        };
        let Some(local_random) = self.local_random.take() else {
            return;
        };

        let peer_random = random.random_value;
        let expected = self.confirm_value(&peer_random, &exchange);

        if !bool::from(expected[..].ct_eq(&remote_confirm[..])) {
            warn!(peer = %self.initiator, "pairing confirm value mismatch");
            self.send(PairingFailed::new(FailureReason::ConfirmValueFailed).serialize());
            self.fail(FailureReason::ConfirmValueFailed, false);
            return;
        }

        let stk = Zeroizing::new(self.crypto.s1(
            &self.config.temporary_key,
            &local_random,
            &peer_random,
        ));
        let (ediv, rand) = self.key_identity();
        let authenticated = self.config.features.has_oob_data();

        let ltk = LongTermKey {
            address: self.initiator.address,
            address_type: self.initiator.address_type,
            authenticated,
            central: false,
            ediv,
            rand: *rand,
            key: *stk,
        };
        if let Err(err) = self.registrar.register(&ltk) {
            warn!(peer = %self.initiator, %err, "failed to register long term key");
        }

        self.keys = Some(KeyBundle { stk, ediv, rand });
        self.send(PairingRandom::new(*local_random).serialize());

        self.discard_attempt();
        self.transition(PairingState::Completed);
        info!(peer = %self.initiator, authenticated, "pairing complete");
        self.notify(SmpEvent::PairingComplete {
            address: self.initiator,
            authenticated,
        });
    }

    fn handle_pairing_failed(&mut self, failed: PairingFailed) {
        self.fail(failed.reason(), true);
    }

    /// c1 over the exchanged PDUs with `random` as the random input
    fn confirm_value(&self, random: &[u8; 16], exchange: &FeatureExchange) -> [u8; 16] {
        self.crypto.c1(
            &self.config.temporary_key,
            random,
            &exchange.pres,
            &exchange.preq,
            self.initiator.address_type.to_bit(),
            &self.initiator.address.bytes,
            self.responder.address_type.to_bit(),
            &self.responder.address.bytes,
        )
    }

    fn key_identity(&mut self) -> (u16, Zeroizing<[u8; 8]>) {
        let mut rand = Zeroizing::new([0u8; 8]);
        match self.config.key_identity {
            KeyIdentityPolicy::Fixed => (0, rand),
            KeyIdentityPolicy::Random => {
                let mut ediv = [0u8; 2];
                self.crypto.random_bytes(&mut ediv);
                self.crypto.random_bytes(&mut rand[..]);
                (u16::from_le_bytes(ediv), rand)
            }
        }
    }

    fn fail(&mut self, reason: FailureReason, remote: bool) {
        warn!(peer = %self.initiator, %reason, remote, "pairing failed");
        self.discard_attempt();
        self.keys = None;
        self.transition(PairingState::Failed);
        self.notify(SmpEvent::PairingFailed {
            address: self.initiator,
            reason,
            remote,
        });
    }

    /// Every caller leaves the responder in a terminal state, so the TK goes too
    fn discard_attempt(&mut self) {
        self.exchange = None;
        self.remote_confirm = None;
        self.local_random = None;
        self.config.temporary_key.zeroize();
    }

    fn transition(&mut self, next: PairingState) {
        debug!(peer = %self.initiator, from = %self.state, to = %next, "pairing state change");
        self.state = next;
    }

    fn send(&mut self, pdu: Vec<u8>) {
        let Some(link) = self.link.as_mut() else {
            return;
        };

        if let Err(err) = link.send(SMP_CID, &pdu) {
            warn!(peer = %self.initiator, %err, opcode = pdu[0], "failed to send SMP PDU");
        }
    }

    fn notify(&mut self, event: SmpEvent) {
        if let Some(callback) = self.event_callback.as_mut() {
            callback(event);
        }
    }
}
