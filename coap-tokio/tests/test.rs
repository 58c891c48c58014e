use coap_core::handler::{AllowedMethods, HandlerOutcome, ResponseListener, ResponseView};
use coap_core::message::MsgCode;
use coap_core::responder::Responder;
use coap_core::{Error, StandardCoapConstants};
use coap_tokio::TokioEndpoint;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::LocalSet;

struct HelloHandler;

impl coap_core::handler::RequestHandler for HelloHandler {
    fn allowed_methods(&self) -> AllowedMethods {
        AllowedMethods::GET
    }

    fn handle_request(
        &mut self,
        _code: MsgCode,
        _path: &[&str],
        _query: &[&str],
        _payload: &[u8],
        _token: coap_core::message::MsgToken,
        _block1: Option<coap_core::BlockInfo>,
        _block2: Option<coap_core::BlockInfo>,
        responder: &mut dyn Responder,
    ) -> HandlerOutcome {
        match responder.respond(MsgCode::SuccessContent, b"hello") {
            Ok(()) => HandlerOutcome::Responded,
            Err(e) => HandlerOutcome::Error(e),
        }
    }
}

struct OneShotListener(Option<oneshot::Sender<Result<Vec<u8>, Error>>>);

impl ResponseListener for OneShotListener {
    fn on_response(&mut self, result: Result<ResponseView<'_>, Error>) {
        let sent = result.map(|view| view.payload.to_vec());
        if let Some(tx) = self.0.take() {
            let _ = tx.send(sent);
        }
    }
}

async fn request_and_await(client: &TokioEndpoint<StandardCoapConstants>, to: std::net::SocketAddr, path: &str) -> Result<Vec<u8>, Error> {
    let (tx, rx) = oneshot::channel();
    client
        .send_request(
            true,
            MsgCode::MethodGet,
            to,
            &[path],
            &[],
            b"",
            Box::new(OneShotListener(Some(tx))),
        )
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("response arrived before timeout")
        .expect("listener dropped without responding")
}

#[tokio::test(flavor = "current_thread")]
async fn client_request_reaches_server_handler_over_loopback() {
    LocalSet::new()
        .run_until(async {
            let server = TokioEndpoint::bind("127.0.0.1:0", StandardCoapConstants::default())
                .await
                .expect("server bind");
            server
                .register_handler("hello", AllowedMethods::GET, Box::new(HelloHandler))
                .unwrap();
            let server_addr = server.local_addr().unwrap();
            tokio::task::spawn_local(async move {
                let _ = server.run().await;
            });

            let client = TokioEndpoint::bind("127.0.0.1:0", StandardCoapConstants::default())
                .await
                .expect("client bind");
            let client_for_loop = client.clone();
            tokio::task::spawn_local(async move {
                let _ = client_for_loop.run().await;
            });

            let result = request_and_await(&client, server_addr, "hello").await;
            assert_eq!(result.unwrap(), b"hello");
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn request_to_an_unregistered_path_is_not_found() {
    LocalSet::new()
        .run_until(async {
            let server = TokioEndpoint::bind("127.0.0.1:0", StandardCoapConstants::default())
                .await
                .expect("server bind");
            let server_addr = server.local_addr().unwrap();
            tokio::task::spawn_local(async move {
                let _ = server.run().await;
            });

            let client = TokioEndpoint::bind("127.0.0.1:0", StandardCoapConstants::default())
                .await
                .expect("client bind");
            let client_for_loop = client.clone();
            tokio::task::spawn_local(async move {
                let _ = client_for_loop.run().await;
            });

            // No handler and no default handler: the dispatcher answers `4.04 Not Found`,
            // which still completes the listener (with an empty payload) instead of
            // timing out.
            let result = request_and_await(&client, server_addr, "nonexistent").await;
            assert!(result.unwrap().is_empty());
        })
        .await;
}
