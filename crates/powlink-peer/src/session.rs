use std::sync::Arc;

use powlink_engine::{EngineGateway, Trytes};
use powlink_frame::{command, decode_payload, MessageReader, MessageWriter, ParseEvent, Payload};
use powlink_transport::IpcStream;
use tracing::debug;

/// State shared by every session of one broker.
#[derive(Debug)]
pub struct BrokerContext {
    gateway: Arc<EngineGateway>,
    max_difficulty: u8,
    server_version: String,
}

impl BrokerContext {
    pub fn new(gateway: Arc<EngineGateway>, max_difficulty: u8) -> Self {
        Self {
            gateway,
            max_difficulty,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn gateway(&self) -> &Arc<EngineGateway> {
        &self.gateway
    }

    pub fn max_difficulty(&self) -> u8 {
        self.max_difficulty
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }
}

/// One framed reply, always carrying the request's correlation token
/// (or zero when the request never decoded far enough to know it).
#[derive(Debug, PartialEq, Eq)]
struct Reply {
    req_id: u8,
    command: u8,
    data: Vec<u8>,
}

impl Reply {
    fn response(req_id: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            req_id,
            command: command::RESPONSE,
            data: data.into(),
        }
    }

    fn error(req_id: u8, message: impl Into<String>) -> Self {
        Self {
            req_id,
            command: command::ERROR,
            data: message.into().into_bytes(),
        }
    }
}

/// Handle one accepted connection until its socket errors out.
///
/// Protocol-level failures are answered in-band and the session continues;
/// only transport failures end it.
pub fn run_session(stream: IpcStream, ctx: &BrokerContext) {
    let reader_stream = match stream.try_clone() {
        Ok(cloned) => cloned,
        Err(err) => {
            debug!(%err, "failed to clone session stream");
            return;
        }
    };
    let mut reader = MessageReader::new(reader_stream);
    let mut writer = MessageWriter::new(stream);

    loop {
        let event = match reader.next_event() {
            Ok(event) => event,
            Err(err) => {
                debug!(%err, "session ended");
                return;
            }
        };

        let reply = match event {
            ParseEvent::Payload(payload) => dispatch(&payload, ctx),
            ParseEvent::ChecksumMismatch { computed, received } => {
                debug!(computed, received, "checksum mismatch");
                Reply::error(
                    0,
                    format!(
                        "wrong checksum (computed 0x{computed:02X}, received 0x{received:02X})"
                    ),
                )
            }
        };

        if let Err(err) = writer.send(reply.req_id, reply.command, &reply.data) {
            debug!(%err, "session write failed");
            return;
        }
    }
}

fn dispatch(payload: &[u8], ctx: &BrokerContext) -> Reply {
    let payload = match decode_payload(payload) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(%err, "malformed payload");
            return Reply::error(0, err.to_string());
        }
    };

    debug!(
        req_id = payload.req_id,
        command = command::command_name(payload.command),
        "received command"
    );

    match payload.command {
        command::GET_SERVER_VERSION => {
            Reply::response(payload.req_id, ctx.server_version().as_bytes())
        }
        command::GET_ENGINE_TYPE => Reply::response(
            payload.req_id,
            ctx.gateway.descriptor().engine_type.as_bytes(),
        ),
        command::GET_ENGINE_VERSION => Reply::response(
            payload.req_id,
            ctx.gateway.descriptor().engine_version.as_bytes(),
        ),
        command::DO_WORK => do_work(&payload, ctx),
        other => Reply::error(payload.req_id, format!("unknown command: 0x{other:02X}")),
    }
}

fn do_work(payload: &Payload, ctx: &BrokerContext) -> Reply {
    let Some((&difficulty, work)) = payload.data.split_first() else {
        return Reply::error(payload.req_id, "work request carries no difficulty byte");
    };

    if difficulty > ctx.max_difficulty {
        debug!(
            difficulty,
            allowed = ctx.max_difficulty,
            "difficulty refused"
        );
        return Reply::error(
            payload.req_id,
            format!(
                "difficulty too high: requested {difficulty}, allowed {}",
                ctx.max_difficulty
            ),
        );
    }

    let input = match Trytes::from_bytes(work) {
        Ok(input) => input,
        Err(err) => {
            debug!(%err, "work input rejected");
            return Reply::error(payload.req_id, err.to_string());
        }
    };

    match ctx.gateway.execute(&input, difficulty) {
        Ok(nonce) => Reply::response(payload.req_id, nonce.as_bytes()),
        Err(err) => {
            debug!(%err, "engine call failed");
            Reply::error(payload.req_id, err.to_string())
        }
    }
}
