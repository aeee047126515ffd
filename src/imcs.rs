use std::{
    io::{BufRead, BufReader, Write},
    net::TcpStream,
    sync::LazyLock,
};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use regex::Regex;

use crate::{
    board::Color,
    error::MinichessError,
    position::Position,
    search::SearchStrategy,
};

pub const PROTOCOL_BANNER: &str = "imcs 2.5";
pub const DEFAULT_HOST: &str = "imcs.svcs.cs.pdx.edu";
pub const DEFAULT_PORT: u16 = 3589;

const LINE_ENDING: &str = "\r\n";

static RESPONSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3}) ?(.*)$").expect("response pattern should compile"));

/// A server line that starts with a three digit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub text: String,
}

/// Client for the Internet MiniChess Server line protocol
pub struct ImcsClient<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl ImcsClient<BufReader<TcpStream>, TcpStream> {
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        info!("Connecting to {host}:{port}");
        let stream = TcpStream::connect((host, port)).with_context(|| format!("connecting to {host}:{port}"))?;
        let reader = BufReader::new(stream.try_clone().context("cloning the server stream")?);
        Ok(ImcsClient::new(reader, stream))
    }
}

impl<R: BufRead, W: Write> ImcsClient<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        ImcsClient { reader, writer }
    }

    /// `None` at end of stream
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("reading from the server")?;
        if read == 0 {
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']).to_string();
        debug!("<< {line}");
        Ok(Some(line))
    }

    fn send(&mut self, line: &str) -> Result<()> {
        debug!(">> {line}");
        write!(self.writer, "{line}{LINE_ENDING}").context("writing to the server")?;
        self.writer.flush().context("flushing the server stream")?;
        Ok(())
    }

    /// Reads lines until one carries a response code. Chatter without a code is skipped.
    pub fn expect_response(&mut self) -> Result<Response> {
        loop {
            let Some(line) = self.read_line()? else {
                bail!("server closed the connection while a response was expected");
            };

            if let Some(captures) = RESPONSE_REGEX.captures(&line) {
                let code = captures[1].parse::<u16>().context("parsing response code")?;
                return Ok(Response {
                    code,
                    text: captures[2].to_string(),
                });
            }
        }
    }

    fn expect_code(&mut self, code: u16) -> Result<Response> {
        let response = self.expect_response()?;
        if response.code != code {
            bail!("expected response {code} but got {} {}", response.code, response.text);
        }
        Ok(response)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let banner = self.expect_response()?;
        if banner.text != PROTOCOL_BANNER {
            bail!("server speaks '{}' but '{PROTOCOL_BANNER}' was expected", banner.text);
        }

        self.send(&format!("me {username} {password}"))?;
        self.expect_code(201).context("logging in")?;
        info!("Logged in as {username}");
        Ok(())
    }

    /// Offers a game and waits for an opponent. Returns the color the server assigned.
    pub fn offer(&mut self, color: Option<Color>) -> Result<Color> {
        match color {
            Some(c) => self.send(&format!("offer {}", c.to_char()))?,
            None => self.send("offer")?,
        }
        let offered = self.expect_code(103).context("offering a game")?;
        info!("Offered game: {}", offered.text);

        self.assigned_color().context("waiting for an opponent")
    }

    pub fn accept(&mut self, game_id: &str, color: Option<Color>) -> Result<Color> {
        match color {
            Some(c) => self.send(&format!("accept {game_id} {}", c.to_char()))?,
            None => self.send(&format!("accept {game_id}"))?,
        }

        self.assigned_color().with_context(|| format!("accepting game {game_id}"))
    }

    fn assigned_color(&mut self) -> Result<Color> {
        let response = self.expect_response()?;
        match response.code {
            105 => Ok(Color::White),
            106 => Ok(Color::Black),
            code => Err(anyhow!("unknown response code {code} {}", response.text)),
        }
    }

    /// The opponent's move text, or `None` once the game is over or the server hung up.
    pub fn get_move(&mut self) -> Result<Option<String>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            if line.starts_with('=') {
                info!("Game over: {line}");
                return Ok(None);
            }

            if line.starts_with('!') {
                let text = line.get(2..).ok_or_else(|| anyhow!("move line '{line}' has no move"))?;
                return Ok(Some(text.trim().to_string()));
            }
        }
    }

    /// Waits for the server's move prompt, then sends `move_text`.
    pub fn send_move(&mut self, move_text: &str) -> Result<()> {
        loop {
            match self.read_line()? {
                None => bail!("server terminated unexpectedly"),
                Some(line) if line.starts_with('?') => break,
                Some(_) => {}
            }
        }

        self.send(move_text)
    }
}

/// Plays a whole game as `color`, keeping a local position in step with the server.
/// Returns the final local position.
///
/// Opponent moves are checked against the local rules. The bishop here steps diagonally and
/// slides orthogonally, while the IMCS server lets it slide diagonally, so a diagonal bishop
/// slide from a server opponent is rejected as an illegal move and ends the game with an error.
pub fn play_game<R: BufRead, W: Write>(
    client: &mut ImcsClient<R, W>,
    color: Color,
    depth: u8,
    strategy: SearchStrategy,
) -> Result<Position> {
    let mut position = Position::new_game();
    info!("Playing {color} at depth {depth} with {strategy}");

    while !position.is_game_over() {
        if position.side_to_move() == color {
            let r#move = match position.engine_move(depth, strategy) {
                Ok(m) => m,
                Err(MinichessError::NoLegalMoves { side }) => {
                    info!("{side} has no moves left");
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            client.send_move(&r#move.to_string())?;
            position.apply_move(r#move)?;
        } else {
            let Some(text) = client.get_move()? else {
                break;
            };
            position
                .apply_move_text(&text)
                .with_context(|| format!("applying opponent move '{text}'"))?;
        }
    }

    match (position.is_game_over(), position.winner()) {
        (true, Some(winner)) => info!("{winner} won"),
        (true, None) => info!("Game drawn"),
        (false, _) => info!("Game ended by the server at move {}", position.move_counter()),
    }

    Ok(position)
}

#[cfg(test)]
mod imcs_tests {
    use std::io::Cursor;

    use super::*;

    fn client(script: &str) -> ImcsClient<Cursor<Vec<u8>>, Vec<u8>> {
        ImcsClient::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn sent(client: &ImcsClient<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(client.writer.clone()).unwrap()
    }

    #[test]
    pub fn login_checks_banner_and_code() {
        let mut client = client("100 imcs 2.5\r\n201 hello alice\r\n");
        client.login("alice", "secret").unwrap();
        assert_eq!("me alice secret\r\n", sent(&client));
    }

    #[test]
    pub fn wrong_banner_is_rejected() {
        let mut client = client("100 imcs 2.0\r\n201 hello alice\r\n");
        assert!(client.login("alice", "secret").is_err());
        assert_eq!("", sent(&client));
    }

    #[test]
    pub fn failed_login_is_an_error() {
        let mut client = client("100 imcs 2.5\r\n401 bad password\r\n");
        assert!(client.login("alice", "wrong").is_err());
    }

    #[test]
    pub fn response_skips_chatter() {
        let mut client = client("hello\r\n\r\n12\r\nab3 nope\r\n100 imcs 2.5\r\n");
        assert_eq!(
            Response {
                code: 100,
                text: PROTOCOL_BANNER.to_string()
            },
            client.expect_response().unwrap()
        );
    }

    #[test]
    pub fn response_at_end_of_stream_is_an_error() {
        assert!(client("chatter only\r\n").expect_response().is_err());
    }

    #[test]
    pub fn offer_returns_assigned_color() {
        let mut client = client("103 1234 game waiting for offer acceptance\r\n106 1234 game starts\r\n");
        assert_eq!(Color::Black, client.offer(Some(Color::Black)).unwrap());
        assert_eq!("offer b\r\n", sent(&client));

        let mut client = self::client("103 7 waiting\r\n105 7 game starts\r\n");
        assert_eq!(Color::White, client.offer(None).unwrap());
        assert_eq!("offer\r\n", sent(&client));
    }

    #[test]
    pub fn offer_with_unknown_code_is_an_error() {
        assert!(client("103 waiting\r\n999 what\r\n").offer(None).is_err());
        assert!(client("408 no\r\n").offer(None).is_err());
    }

    #[test]
    pub fn accept_returns_assigned_color() {
        let mut client = client("105 15598 game starts\r\n");
        assert_eq!(Color::White, client.accept("15598", Some(Color::White)).unwrap());
        assert_eq!("accept 15598 w\r\n", sent(&client));

        assert!(self::client("408 no such game\r\n").accept("1", None).is_err());
    }

    #[test]
    pub fn get_move_reads_opponent_moves() {
        let mut client = client("? 5:00.000 5:00.000\r\n! a2-a3\r\n= B wins\r\n");
        assert_eq!(Some(String::from("a2-a3")), client.get_move().unwrap());
        assert_eq!(None, client.get_move().unwrap());
        // End of stream is also the end of the game
        assert_eq!(None, client.get_move().unwrap());
    }

    #[test]
    pub fn send_move_waits_for_the_prompt() {
        let mut client = client("1 W\r\nkqbnr\r\n\r\n? 5:00.000 5:00.000\r\n");
        client.send_move("b1-c3").unwrap();
        assert_eq!("b1-c3\r\n", sent(&client));

        let mut client = self::client("no prompt\r\n");
        assert!(client.send_move("b1-c3").is_err());
        assert_eq!("", sent(&client));
    }

    #[test]
    pub fn play_game_as_white() {
        let mut client = client("? 5:00\r\n! a5-a4\r\n? 5:00\r\n= W wins\r\n");
        let position = play_game(&mut client, Color::White, 1, SearchStrategy::AlphaBeta).unwrap();

        // Every move ties at depth 1 so the first is played, then the knight takes a pawn
        assert_eq!("b1-c3\r\nc3-d5\r\n", sent(&client));
        assert_eq!(2, position.move_counter());
        assert_eq!(Color::Black, position.side_to_move());
    }

    #[test]
    pub fn play_game_as_black() {
        let mut client = client("! a2-a3\r\n? 5:00\r\n= draw\r\n");
        let position = play_game(&mut client, Color::Black, 1, SearchStrategy::Negamax).unwrap();

        assert_eq!("a5-a4\r\n", sent(&client));
        assert_eq!(2, position.move_counter());
    }

    #[test]
    pub fn diagonal_bishop_slide_from_the_opponent_is_rejected() {
        // c1-b2 would be a legal step, c1-a3 slides two squares diagonally
        let mut client = client("! b2-b3\r\n? 5:00\r\n! c1-a3\r\n");
        let result = play_game(&mut client, Color::Black, 1, SearchStrategy::AlphaBeta);

        assert!(result.is_err());
        assert_eq!("a5-a4\r\n", sent(&client));
    }

    #[test]
    pub fn illegal_opponent_move_is_an_error() {
        let mut client = client("! a2-a4\r\n");
        assert!(play_game(&mut client, Color::Black, 1, SearchStrategy::AlphaBeta).is_err());
    }
}
