mod websocket;

pub use websocket::WebSocketGateway;
