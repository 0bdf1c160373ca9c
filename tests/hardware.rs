mod tests {
    use std::{fs, path::PathBuf};

    use arcade_led_core::{
        Error,
        config::Attributes,
        hardware::{
            Hardware, PortSpec, Serial, SerialConfig, SerialLink, Usb, UsbConfig, close_session,
            dump::{DUMP_READ_PAYLOAD, DumpLink, DumpUsbBackend},
            serial::{PortLink, scan_by_id},
            set_dump_mode,
            usb::has_session,
        },
    };

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arcade-led-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn serial_config(port: &str) -> SerialConfig {
        SerialConfig::new(PortSpec::parse(port).unwrap())
    }

    fn usb_config(board_id: u8) -> UsbConfig {
        UsbConfig::new(0xD209, 0x1500, 0, board_id, 4).unwrap()
    }

    #[test]
    fn test_port_spec() {
        assert_eq!(
            PortSpec::parse("/dev/ttyUSB0").unwrap(),
            PortSpec::Path(PathBuf::from("/dev/ttyUSB0"))
        );
        assert_eq!(
            PortSpec::parse("2341:0043").unwrap(),
            PortSpec::UsbId {
                vendor_id: 0x2341,
                product_id: 0x0043
            }
        );
        assert_eq!(
            PortSpec::parse("Arduino_Uno").unwrap(),
            PortSpec::ById("Arduino_Uno".to_string())
        );
        assert!(matches!(PortSpec::parse(" "), Err(Error::Configuration(_))));
        assert!(matches!(
            PortSpec::parse("serial/by-id"),
            Err(Error::Configuration(_))
        ));
        assert_eq!(PortSpec::parse("2341:0043").unwrap().to_string(), "2341:0043");
    }

    #[test]
    fn test_serial_config_from_attributes() {
        let config = SerialConfig::from_attributes(&Attributes::new().with("port", "/dev/ttyACM0")).unwrap();
        assert_eq!(config.baud_rate, 115_200);

        let attributes = Attributes::new()
            .with("port", "/dev/ttyACM0")
            .with("baudRate", "57600")
            .with("timeout", "250");
        let config = SerialConfig::from_attributes(&attributes).unwrap();
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.timeout.as_millis(), 250);

        assert!(SerialConfig::from_attributes(&Attributes::new()).is_err());
        let attributes = attributes.with("baudRate", "0");
        assert!(SerialConfig::from_attributes(&attributes).is_err());
    }

    #[test]
    fn test_serial_dry_run() {
        let link = DumpLink::default();
        let journal = link.journal();
        let mut serial = Serial::with_link("panel", serial_config("/dev/ttyFAKE0"), Box::new(link));

        serial.connect().unwrap();
        assert!(serial.is_connected());
        assert_eq!(serial.port(), Some(PathBuf::from("/dev/ttyFAKE0").as_path()));

        serial.transfer_to_connection(b"Hi").unwrap();
        assert_eq!(journal.entries(), [b"Hi".to_vec()]);
        assert_eq!(serial.transfer_from_connection(64).unwrap(), DUMP_READ_PAYLOAD);
        assert_eq!(serial.transfer_from_connection(2).unwrap(), b"DU");

        serial.disconnect();
        serial.disconnect();
        assert!(!serial.is_connected());
        assert_eq!(
            serial.transfer_to_connection(b"Hi"),
            Err(Error::NotConnected)
        );
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_serial_requires_connection() {
        let mut serial = Serial::with_link(
            "panel",
            serial_config("/dev/ttyFAKE0"),
            Box::new(DumpLink::default()),
        );
        serial.disconnect();
        assert_eq!(serial.transfer_to_connection(b"x"), Err(Error::NotConnected));
        assert_eq!(serial.transfer_from_connection(1), Err(Error::NotConnected));

        serial.initialize().unwrap();
        serial.initialize().unwrap();
        serial.terminate().unwrap();
        serial.terminate().unwrap();
        assert!(serial.full_name().contains("/dev/ttyFAKE0"));
    }

    #[test]
    fn test_dump_mode_serial() {
        set_dump_mode(true);
        let mut serial = Serial::new("panel", serial_config("2341:0043"));
        serial.connect().unwrap();
        assert_eq!(serial.port(), Some(PathBuf::from("dump:2341:0043").as_path()));
        serial.transfer_to_connection(&[0x48, 0x69]).unwrap();
        assert_eq!(serial.transfer_from_connection(16).unwrap(), DUMP_READ_PAYLOAD);
        serial.disconnect();
    }

    #[test]
    fn test_scan_by_id() {
        let dir = scratch_dir("by-id");
        fs::write(dir.join("usb-Arduino_Uno_1234-if00"), b"").unwrap();
        fs::write(dir.join("usb-FTDI_FT232R-if00"), b"").unwrap();

        let found = scan_by_id(&dir, "Arduino").unwrap();
        assert_eq!(
            found.file_name().unwrap().to_str(),
            Some("usb-Arduino_Uno_1234-if00")
        );
        assert!(matches!(scan_by_id(&dir, "CH340"), Err(Error::NotFound(_))));
        assert!(matches!(
            scan_by_id(&dir.join("missing"), "Arduino"),
            Err(Error::NotFound(_))
        ));

        let link = PortLink::with_by_id_dir(&dir);
        assert_eq!(
            link.resolve(&PortSpec::ById("FTDI".to_string())).unwrap(),
            fs::canonicalize(dir.join("usb-FTDI_FT232R-if00")).unwrap()
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_open_rejects_non_terminal() {
        let dir = scratch_dir("not-a-tty");
        let path = dir.join("plain-file");
        fs::write(&path, b"").unwrap();

        let config = SerialConfig::new(PortSpec::Path(path.clone()));
        let mut link = PortLink::default();
        assert!(matches!(
            link.open(&path, &config),
            Err(Error::NotATerminal(_))
        ));
        assert!(matches!(
            link.open(&dir.join("absent"), &config),
            Err(Error::Connection(_))
        ));

        let mut serial = Serial::with_link("panel", config, Box::new(PortLink::default()));
        assert!(matches!(serial.connect(), Err(Error::NotATerminal(_))));
        assert!(!serial.is_connected());
        let _ = fs::remove_dir_all(&dir);

        // A character device is not necessarily a terminal
        let null = PathBuf::from("/dev/null");
        let mut serial = Serial::with_link(
            "panel",
            SerialConfig::new(PortSpec::Path(null)),
            Box::new(PortLink::default()),
        );
        assert!(matches!(serial.connect(), Err(Error::NotATerminal(_))));
        assert!(!serial.is_connected());
    }

    #[test]
    fn test_usb_board_id_validation() {
        for board_id in 1..=4 {
            assert!(UsbConfig::new(0xD209, 0x1500, 0, board_id, 4).is_ok());
        }
        for board_id in [0, 5, 255] {
            assert!(matches!(
                UsbConfig::new(0xD209, 0x1500, 0, board_id, 4),
                Err(Error::Configuration(_))
            ));
        }
        assert!(UsbConfig::new(0xD209, 0x1500, 0, 1, 0).is_err());

        let mut config = usb_config(1);
        config.board_id = 9;
        assert!(Usb::with_backend("pac", config, Box::new(DumpUsbBackend::default())).is_err());
    }

    #[test]
    fn test_usb_config_from_attributes() {
        let attributes = Attributes::new()
            .with("vendorId", "d209")
            .with("productId", "0x1502")
            .with("boardId", "3");
        let config = UsbConfig::from_attributes(&attributes, 4).unwrap();
        assert_eq!(
            (config.vendor_id, config.product_id, config.interface, config.board_id),
            (0xD209, 0x1502, 0, 3)
        );

        assert!(UsbConfig::from_attributes(&attributes.clone().with("boardId", "7"), 4).is_err());
        assert!(UsbConfig::from_attributes(&attributes.clone().with("boardId", "-1"), 4).is_err());
        assert!(UsbConfig::from_attributes(&Attributes::new().with("vendorId", "d209"), 4).is_err());
    }

    #[test]
    fn test_usb_dry_run() {
        let backend = DumpUsbBackend::default();
        let journal = backend.journal();
        let mut usb = Usb::with_backend("pac", usb_config(2), Box::new(backend)).unwrap();

        assert_eq!(usb.claim_interface(), Err(Error::NotConnected));
        assert_eq!(
            usb.transfer_to_connection(0x0200, &[0, 0, 1, 2]),
            Err(Error::NotConnected)
        );

        usb.connect().unwrap();
        assert!(usb.is_connected());
        assert!(usb.is_claimed());

        usb.transfer_to_connection(0x0200, b"Hi").unwrap();
        assert_eq!(journal.last(), Some(b"Hi".to_vec()));
        assert_eq!(usb.transfer_from_connection(0x81, 2).unwrap(), b"DU");

        usb.disconnect();
        usb.disconnect();
        assert!(!usb.is_connected());
        assert!(!usb.is_claimed());
        assert_eq!(
            usb.transfer_from_connection(0x81, 2),
            Err(Error::NotConnected)
        );
        assert!(usb.full_name().contains("d209:1500"));
    }

    #[test]
    fn test_dump_mode_usb() {
        set_dump_mode(true);
        let mut usb = Usb::new("pac", usb_config(1)).unwrap();
        usb.initialize().unwrap();
        usb.transfer_to_connection(0x0200, &[0, 0, 0, 1]).unwrap();
        usb.terminate().unwrap();
        usb.terminate().unwrap();
        assert!(Usb::new("pac", UsbConfig { board_id: 0, ..usb_config(1) }).is_err());
    }

    #[test]
    fn test_close_session_is_idempotent() {
        close_session();
        close_session();
        assert!(!has_session());
    }
}
