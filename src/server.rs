use log::{debug, info};
use std::io::{self, BufReader, BufWriter, Read};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::args::Args;
use crate::error::ServeError;
use crate::file_serving::StaticAssetResponder;
use crate::http::Request;
use crate::log_error;

/// Upper bound on request bytes read and thrown away after the reply is written.
const MAX_DRAIN: u64 = 256 * 1024;

pub fn start_server(args: Args) -> io::Result<()> {
    let responder = StaticAssetResponder::new(&args.serve_dir)?;
    let listener = TcpListener::bind(&args.listen_addr)?;
    println!(
        "Serving {} on {}",
        responder.root().display(),
        listener.local_addr()?
    );

    // Zero disables the timeout
    let timeout = Some(args.timeout).filter(|t| !t.is_zero());
    serve(listener, Arc::new(responder), timeout)
}

/// Accepts connections forever, one thread per connection.
pub fn serve(
    listener: TcpListener,
    responder: Arc<StaticAssetResponder>,
    timeout: Option<Duration>,
) -> io::Result<()> {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log_error!(e, "Failed to accept connection");
                continue;
            }
        };
        let responder = Arc::clone(&responder);

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &responder, timeout) {
                log_error!(e, "Error handling connection");
            }
        });
    }

    Ok(())
}

pub fn handle_connection(
    client: TcpStream,
    responder: &StaticAssetResponder,
    timeout: Option<Duration>,
) -> io::Result<()> {
    match client.peer_addr() {
        Ok(peer) => info!("New connection from {}", peer),
        Err(_) => info!("New connection received"),
    }
    client.set_read_timeout(timeout)?;
    client.set_write_timeout(timeout)?;

    let mut reader = BufReader::new(&client);
    let response = match Request::parse(&mut reader) {
        Ok(Some(request)) => responder.handle(&request),
        Ok(None) => {
            debug!("Connection closed before a request arrived");
            return Ok(());
        }
        Err(ServeError::Io(e))
            if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
        {
            debug!("Timed out waiting for a request");
            return Ok(());
        }
        Err(e) => responder.handle_error(&e),
    };

    let mut writer = BufWriter::new(&client);
    response.write_to(&mut writer)?;
    drop(writer);

    // Closing with unread input resets the connection and the client loses the reply
    client.shutdown(Shutdown::Write)?;
    let drained = io::copy(&mut reader.take(MAX_DRAIN), &mut io::sink()).unwrap_or(0);
    debug!("Drained {} unread bytes before closing", drained);
    Ok(())
}
