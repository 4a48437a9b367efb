use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use jamroom_collab::{ConnectionId, Delivery};
use log::{debug, error, info};
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::spawn_blocking,
};

use crate::{context::ServerContext, events::ServerEvent, relay, Router};

/// Keeps the outbound queue of every open socket.
///
/// Each socket has a writer task draining its queue, so a slow client never
/// blocks delivery to the others.
pub struct Gateway {
    connections: DashMap<ConnectionId, UnboundedSender<ServerEvent>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            connections: Default::default(),
        }
    }

    /// Allocates a connection id and the queue its events arrive on
    pub fn register(&self) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (sender, receiver) = unbounded_channel();

        self.connections.insert(id, sender);
        (id, receiver)
    }

    pub fn unregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Queues an event for one connection. Returns false if it is gone.
    pub fn send(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let Some(sender) = self.connections.get(&id) else {
            return false;
        };

        sender.send(event).is_ok()
    }

    /// Converts a collab event and queues it for each of its recipients
    pub fn deliver(&self, delivery: Delivery) {
        let room_id = delivery.event.room_id().clone();
        let event = ServerEvent::from(delivery.event);

        for recipient in delivery.recipients {
            if !self.send(recipient, event.clone()) {
                debug!(
                    "Dropped event for closed connection {} in room {}",
                    recipient, room_id
                );
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves collab events onto connection queues until the collab system shuts down
pub async fn forward_events(context: ServerContext) {
    loop {
        let receiver = context.collab.events();

        let delivery = match spawn_blocking(move || receiver.recv()).await {
            Ok(Ok(delivery)) => delivery,
            Ok(Err(_)) => break,
            Err(e) => {
                error!("Event forwarder failed: {}", e);
                break;
            }
        };

        context.gateway.deliver(delivery);
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(context): State<ServerContext>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, context))
}

async fn handle_socket(socket: WebSocket, context: ServerContext) {
    let (id, mut outgoing) = context.gateway.register();
    let (mut sink, mut stream) = socket.split();

    info!("Connection {} opened", id);

    context
        .gateway
        .send(id, ServerEvent::welcome(id, context.collab.config()));

    let writer = tokio::spawn(async move {
        while let Some(event) = outgoing.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => relay::process(&context, id, &text).await,
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    context.collab.rooms.disconnect(id);
    context.gateway.unregister(id);
    writer.abort();

    info!("Connection {} closed", id);
}

pub fn router() -> Router {
    Router::new().route("/", get(upgrade))
}
