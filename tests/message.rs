mod tests {
    use arcade_led_core::{
        Error,
        channel::{MessageChannel, QueueFull},
        message::{Flags, Message, MessageType, RECORD_SEPARATOR, sub_fields, sub_sub_fields},
    };

    #[test]
    fn test_wire_form() {
        let message = Message::set_element("P1_A", "Red");
        assert_eq!(message.encode().unwrap(), "P1_A\x1eRed\x1e0\x1e3\x1e");

        let message = Message::new(MessageType::ClearAllElements, Flags::NONE, Vec::<String>::new())
            .with_flags(Flags::NO_ANIMATIONS | Flags::FORCE_RELOAD);
        assert_eq!(message.encode().unwrap(), "5\x1e7\x1e");
    }

    #[test]
    fn test_round_trip() {
        let flags = [
            Flags::NONE,
            Flags::NO_ANIMATIONS,
            Flags::NO_INPUTS | Flags::FORCE_RELOAD,
        ];
        for (i, kind) in MessageType::ALL.into_iter().enumerate() {
            let message = Message::new(kind, flags[i % flags.len()], ["sf2", "", "Player 1"]);
            let decoded = Message::decode(&message.encode().unwrap()).unwrap();
            assert_eq!(decoded, message);
            assert_eq!(decoded.kind().code(), u8::try_from(i).unwrap());
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(matches!(
            Message::decode("P1_A\x1e0\x1e42\x1e"),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(MessageType::try_from(11u8), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_unknown_flag_bits_are_dropped() {
        let message = Message::decode("P1_A\x1e255\x1e5\x1e").unwrap();
        assert_eq!(message.kind(), MessageType::ClearElement);
        assert_eq!(
            message.flags(),
            Flags::NO_ANIMATIONS | Flags::NO_INPUTS | Flags::FORCE_RELOAD
        );
        assert_eq!(message.fields(), ["P1_A"]);

        let message = Message::decode("8\x1e7\x1e").unwrap();
        assert!(message.flags().is_empty());
        assert!(message.fields().is_empty());
    }

    #[test]
    fn test_malformed_records() {
        for raw in ["", "3", "0\x1e3", "\x1e", "x\x1e3\x1e", "0\x1ex\x1e", "0\x1e-1\x1e"] {
            assert!(
                matches!(Message::decode(raw), Err(Error::Protocol(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_separator_in_field() {
        let field = format!("P1{RECORD_SEPARATOR}A");
        let message = Message::set_element(&field, "Red");
        assert!(matches!(message.encode(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_flags() {
        let mut flags = Flags::NO_INPUTS;
        assert!(flags.contains(Flags::NO_INPUTS));
        assert!(!flags.contains(Flags::FORCE_RELOAD));
        flags.insert(Flags::FORCE_RELOAD);
        assert_eq!(flags.bits(), 6);
        assert_eq!(Flags::from_bits_truncate(0xF8), Flags::NONE);
    }

    #[test]
    fn test_readable_rendering() {
        assert_eq!(Message::set_group("Player1", "Blue").to_string(), "SetGroup|Player1|Blue");
        assert_eq!(
            Message::clear_element("P1_A")
                .with_flags(Flags::NO_ANIMATIONS)
                .to_string(),
            "ClearElement(1)|P1_A"
        );
    }

    #[test]
    fn test_sub_fields() {
        let message = Message::craft_profile("sf2", [("P1_A", "Red"), ("P1_B", "Blue")]);
        assert_eq!(message.kind(), MessageType::CraftProfile);
        assert_eq!(message.field(1), Some("P1_A:Red,P1_B:Blue"));

        let pairs = sub_fields(message.field(1).unwrap())
            .filter_map(sub_sub_fields)
            .collect::<Vec<_>>();
        assert_eq!(pairs, [("P1_A", "Red"), ("P1_B", "Blue")]);
        assert!(MessageType::CraftProfile.is_profile_level());
        assert!(!MessageType::SetGroup.is_profile_level());
    }

    #[test]
    fn test_channel() {
        let channel = MessageChannel::<2>::new();
        let sender = channel.sender();
        let receiver = channel.receiver();

        sender.try_send(Message::clear_element("A")).unwrap();
        sender.try_send(Message::clear_element("B")).unwrap();
        assert_eq!(
            sender.try_send(Message::clear_element("C")),
            Err(QueueFull(Message::clear_element("C")))
        );
        assert_eq!(channel.len(), 2);

        assert_eq!(receiver.try_receive(), Some(Message::clear_element("A")));
        assert_eq!(receiver.try_receive(), Some(Message::clear_element("B")));
        assert_eq!(receiver.try_receive(), None);
        assert!(channel.is_empty());
    }
}
