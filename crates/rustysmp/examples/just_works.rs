/// Example running a Just Works pairing against a simulated initiator
use rustysmp::smp::*;
use rustysmp::*;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing_subscriber::EnvFilter;

/// Link adapter that hands every outbound PDU to the simulated initiator
struct ChannelLink {
    tx: Sender<(u16, Vec<u8>)>,
}

impl LinkAdapter for ChannelLink {
    fn send(&mut self, channel_id: u16, pdu: &[u8]) -> SmpResult<()> {
        self.tx
            .send((channel_id, pdu.to_vec()))
            .map_err(|e| SmpError::Link(e.to_string()))
    }
}

fn recv(rx: &Receiver<(u16, Vec<u8>)>) -> Result<SmpPdu, Box<dyn std::error::Error>> {
    let (_, pdu) = rx.recv()?;
    Ok(SmpPdu::parse(&pdu)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    println!("SMP Just Works Pairing Example");
    println!("------------------------------");

    let local = DeviceAddress::public("B1:B2:B3:B4:B5:B6".parse()?);
    let remote = DeviceAddress::random("C0:11:22:33:44:55".parse()?);

    let (tx, rx) = channel();
    let registrar = MemoryKeyRegistrar::new();
    let mut responder = SmpResponder::new(
        local,
        remote,
        SmpConfig::new().with_features(PairingFeatures::new(
            IoCapability::NoInputNoOutput,
            false,
            AuthRequirements::BONDING,
        )),
        ChannelLink { tx },
        LegacyCrypto::new(),
        registrar.clone(),
    );
    responder.set_event_callback(|event| println!("SMP event: {:?}", event));

    // Initiator side
    let mut crypto = LegacyCrypto::new();
    let tk = [0u8; 16];
    let preq = PairingRequest {
        io_capability: SMP_IO_CAPABILITY_NO_INPUT_NO_OUTPUT,
        oob_data_present: SMP_OOB_NOT_PRESENT,
        auth_req: SMP_AUTH_REQ_BONDING,
        max_key_size: SMP_MAX_ENCRYPTION_KEY_SIZE,
        initiator_key_dist: 0,
        responder_key_dist: SMP_KEY_DIST_ENC_KEY,
    }
    .to_bytes(true);

    responder.on_data(SMP_CID, &preq);
    let pres = match recv(&rx)? {
        SmpPdu::PairingResponse(pres) => pres.to_bytes(false),
        other => return Err(format!("expected a pairing response, got {:?}", other).into()),
    };
    println!("Pairing response: {}", hex::encode(pres));

    let mrand = crypto.random_128();
    let confirm_for = |random: &[u8; 16]| {
        crypto.c1(
            &tk,
            random,
            &pres,
            &preq,
            remote.address_type.to_bit(),
            &remote.address.bytes,
            local.address_type.to_bit(),
            &local.address.bytes,
        )
    };
    let mconfirm = confirm_for(&mrand);
    responder.on_data(SMP_CID, &PairingConfirm::new(mconfirm).serialize());
    let sconfirm = match recv(&rx)? {
        SmpPdu::PairingConfirm(confirm) => confirm.confirm_value,
        other => return Err(format!("expected a pairing confirm, got {:?}", other).into()),
    };

    responder.on_data(SMP_CID, &PairingRandom::new(mrand).serialize());
    let srand = match recv(&rx)? {
        SmpPdu::PairingRandom(random) => random.random_value,
        other => return Err(format!("expected a pairing random, got {:?}", other).into()),
    };

    if confirm_for(&srand) != sconfirm {
        return Err("responder confirm value does not verify".into());
    }
    let stk = crypto.s1(&tk, &srand, &mrand);
    println!("Pairing state: {}", responder.state());

    // The controller would now encrypt the link with the STK
    responder.on_encryption_changed(true);
    for _ in 0..2 {
        match recv(&rx)? {
            SmpPdu::EncryptionInformation(info) => {
                println!("LTK matches STK: {}", info.ltk == stk);
            }
            SmpPdu::MasterIdentification(ident) => {
                println!("EDIV: 0x{:04X}, Rand: {}", ident.ediv, hex::encode(ident.rand));
            }
            other => println!("Unexpected PDU: {:?}", other),
        }
    }

    println!("Registered keys: {}", registrar.len());
    responder.on_link_closed();

    Ok(())
}
