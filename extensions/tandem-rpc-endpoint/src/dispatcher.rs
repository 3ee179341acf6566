//! Routing of decoded inbound packets.
//!
//! The rule, with `self_is_client` being this endpoint's role: a packet
//! whose `is_from_client` equals `self_is_client` is a reply (or remote
//! exception) to a call this side originated, and goes to the pending-call
//! table. Any other packet is a fresh request from the peer and goes to the
//! API registry.

use std::sync::Arc;

use tandem::packet::Packet;
use tandem_rpc_service::Serializer;

use crate::endpoint::EndpointShared;
use crate::error::EndpointError;

pub(crate) fn route_packet<S: Serializer>(shared: &Arc<EndpointShared<S>>, packet: Packet) {
    if packet.is_from_client == shared.role.is_client() {
        route_reply(shared, packet);
    } else {
        route_request(shared, packet);
    }
}

fn route_reply<S: Serializer>(shared: &Arc<EndpointShared<S>>, packet: Packet) {
    let Packet {
        api_name,
        packet_id,
        is_exception,
        body,
        ..
    } = packet;

    let delivered = if is_exception {
        let message = String::from_utf8_lossy(&body).into_owned();
        shared.pending.complete_remote_error(packet_id, message)
    } else {
        shared.pending.complete_value(packet_id, body)
    };

    if !delivered {
        // Late or duplicate reply; its call already timed out or resolved.
        tracing::debug!(packet_id, api_name = %api_name, "dropping reply with no pending call");
    }
}

fn route_request<S: Serializer>(shared: &Arc<EndpointShared<S>>, mut packet: Packet) {
    let Some(descriptor) = shared.registry.try_get(&packet.api_name) else {
        let message = format!("API '{}' not found", packet.api_name);
        send_exception_reply(shared, &packet, &message);
        report_exception(
            shared,
            &packet,
            &EndpointError::ApiNotFound {
                api_name: packet.api_name.clone(),
            },
        );
        return;
    };

    let body = std::mem::take(&mut packet.body);
    let invocation = descriptor.invoke(body);
    let shared = Arc::clone(shared);

    // Handlers run on their own worker so a slow API cannot stall the
    // connection's read path. Reply order across calls therefore need not
    // match request order.
    tokio::spawn(async move {
        match invocation.await {
            Ok(Some(reply_body)) => {
                if shared.is_connected() {
                    let reply = Packet::reply_to(&packet, reply_body);
                    if let Err(err) = shared.send_packet(&reply) {
                        tracing::debug!(
                            packet_id = packet.packet_id,
                            error = %err,
                            "failed to queue reply"
                        );
                    }
                }
            }
            // One-way API: nothing goes back.
            Ok(None) => {}
            Err(api_error) => {
                if shared.is_connected() {
                    send_exception_reply(&shared, &packet, api_error.primary());
                }
                // The first message rode the wire; the hook sees every one.
                for message in api_error.all() {
                    report_exception(
                        &shared,
                        &packet,
                        &EndpointError::ApiExecution {
                            api_name: packet.api_name.clone(),
                            message: message.clone(),
                        },
                    );
                }
            }
        }
    });
}

fn send_exception_reply<S: Serializer>(
    shared: &Arc<EndpointShared<S>>,
    request: &Packet,
    message: &str,
) {
    let reply = Packet::exception_reply_to(request, message);
    if let Err(err) = shared.send_packet(&reply) {
        tracing::debug!(
            packet_id = request.packet_id,
            error = %err,
            "failed to queue exception reply"
        );
    }
}

fn report_exception<S: Serializer>(
    shared: &Arc<EndpointShared<S>>,
    packet: &Packet,
    error: &EndpointError,
) {
    let handled = shared
        .exception_hook
        .as_ref()
        .map(|hook| hook(packet, error))
        .unwrap_or(false);

    if !handled {
        tracing::warn!(api_name = %packet.api_name, error = %error, "unhandled endpoint error");
    }
}
