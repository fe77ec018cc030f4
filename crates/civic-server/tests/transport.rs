//! Control surface and viewer channel over loopback TCP.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use civic_server::{spawn_control_listener, spawn_viewer_listener, City, CityConfig};
use serde_json::{json, Value};

struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        Self {
            writer: stream.try_clone().unwrap(),
            reader: BufReader::new(stream),
        }
    }

    fn send(&mut self, line: &str) {
        writeln!(self.writer, "{line}").unwrap();
    }

    fn recv(&mut self) -> Value {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        serde_json::from_str(&line).unwrap()
    }

    /// Skip messages until one of type `kind` arrives.
    fn recv_type(&mut self, kind: &str) -> Value {
        loop {
            let msg = self.recv();
            if msg["type"] == kind {
                return msg;
            }
        }
    }
}

fn start() -> (Arc<City>, SocketAddr, SocketAddr) {
    let mut config = CityConfig::builtin().unwrap();
    config.data_manager.throttle_time = 20.0;
    let city = Arc::new(City::start(config).unwrap());
    let localhost: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let control = spawn_control_listener(localhost, Arc::clone(&city)).unwrap();
    let viewers = spawn_viewer_listener(localhost, Arc::clone(&city)).unwrap();
    (city, control.local_addr(), viewers.local_addr())
}

#[test]
fn control_surface_round_trip() {
    let (_city, control, _) = start();
    let mut client = Client::connect(control);

    client.send("GET /city");
    let city = client.recv();
    assert_eq!(city["width"], 16);
    assert_eq!(city["cells"][0].as_array().unwrap().len(), 16);

    client.send("GET /config");
    assert_eq!(client.recv()["dataManager"]["throttleTime"], 1000);

    client.send(r#"POST /city/map {"cells": [[3, 4, 2]]}"#);
    assert_eq!(client.recv(), json!({ "status": "ok" }));
    client.send("GET /city");
    assert_eq!(client.recv()["cells"][4][3], 2);

    client.send(r#"POST /city/map {"cells": "nope"}"#);
    assert_eq!(client.recv()["status"], "error");

    client.send("PATCH /city");
    assert_eq!(client.recv()["status"], "error");
}

#[test]
fn viewer_sees_map_and_pass_updates() {
    let (_city, control, viewers) = start();
    let mut viewer = Client::connect(viewers);
    viewer.send(r#"{"type":"ping"}"#);
    assert_eq!(viewer.recv(), json!({ "type": "pong" }));

    let mut ctl = Client::connect(control);
    ctl.send(r#"POST /city/map {"cells": [[0, 0, 1], [1, 0, 1]]}"#);
    assert_eq!(ctl.recv()["status"], "ok");

    let map = viewer.recv_type("map_update");
    assert_eq!(map["cells"][0][0], 1);

    let vars = viewer.recv_type("vars_update");
    assert!(vars["variables"].get("distances").is_some());
    let goals = viewer.recv_type("goals_update");
    assert!(!goals["goals"].as_array().unwrap().is_empty());
    let counters = viewer.recv_type("counters_update");
    assert_eq!(counters["stats"]["1"]["count"], 2);
    assert!(counters["stats"].get("0").is_none());
}

#[test]
fn invalid_viewer_messages_are_dropped() {
    let (_city, _, viewers) = start();
    let mut viewer = Client::connect(viewers);
    viewer.send("garbage");
    viewer.send(r#"{"type":"enable_power_up"}"#);
    viewer.send(r#"{"type":"get_map"}"#);
    let map = viewer.recv();
    assert_eq!(map["type"], "map_update");
    assert_eq!(map["cells"].as_array().unwrap().len(), 16);
}

#[test]
fn map_overlay_is_shared_with_every_viewer() {
    let (_city, _, viewers) = start();
    let mut a = Client::connect(viewers);
    let mut b = Client::connect(viewers);
    for client in [&mut a, &mut b] {
        client.send(r#"{"type":"ping"}"#);
        assert_eq!(client.recv()["type"], "pong");
    }
    a.send(r#"{"type":"view_show_map_var","variable":"distances"}"#);
    for client in [&mut a, &mut b] {
        let msg = client.recv_type("view_show_map_var");
        assert_eq!(msg["variable"], "distances");
        assert_eq!(msg["data"].as_array().unwrap().len(), 16);
    }
}

#[test]
fn wind_post_pushes_counters_then_recalculates() {
    let (city, control, viewers) = start();
    let mut viewer = Client::connect(viewers);
    viewer.send(r#"{"type":"ping"}"#);
    viewer.recv_type("pong");

    let mut ctl = Client::connect(control);
    ctl.send(r#"POST /wind {"winddirection": 90, "windspeed": 0.25}"#);
    assert_eq!(ctl.recv(), json!({ "status": "ok" }));

    let counters = viewer.recv_type("counters_update");
    assert_eq!(counters["wind"]["winddirection"], 90.0);
    viewer.recv_type("vars_update");
    assert_eq!(
        city.engine().get("wind-direction").unwrap(),
        civic_core::Value::Number(90.0)
    );
}
