mod tests {
    use arcade_led_core::{
        Error,
        color::{Color, ColorFormat, ColorRegistry, Colorful, Filter, Rgb},
        element::{ElementRegistry, GroupRegistry},
    };

    fn registry() -> ColorRegistry {
        let mut registry = ColorRegistry::new();
        registry
            .load(
                [("Red", "FF0000"), ("Green", "00FF00"), ("Blue", "0000FF")],
                ColorFormat::Hex,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_advance_cycles_back_to_start() {
        let mut colorful = Colorful::from_names("Red, Green, Blue", &registry()).unwrap();
        assert_eq!(colorful.len(), 3);
        assert_eq!(colorful.current_color().name(), "Red");

        colorful.advance_color();
        assert_eq!(colorful.current_color().name(), "Green");
        colorful.advance_color();
        assert_eq!(colorful.current_color().name(), "Blue");
        colorful.advance_color();
        assert_eq!(colorful.current_color().name(), "Red");
        assert_eq!(colorful.cursor(), 0);

        colorful.advance_color();
        colorful.reset();
        assert_eq!(colorful.current_color().name(), "Red");
    }

    #[test]
    fn test_single_color_is_fixed_point() {
        let mut colorful = Colorful::from_names("Blue", &registry()).unwrap();
        colorful.advance_color();
        assert_eq!(colorful.cursor(), 0);
        colorful.reset();
        assert_eq!(colorful.current_color().name(), "Blue");
        assert!(!colorful.is_fallback());
    }

    #[test]
    fn test_empty_list_falls_back_to_default() {
        for list in ["", " , ,", "  "] {
            let mut colorful = Colorful::from_names(list, &registry()).unwrap();
            assert!(colorful.is_fallback());
            assert_eq!(colorful.len(), 1);
            assert_eq!(colorful.current_color(), &Color::on());

            colorful.advance_color();
            colorful.reset();
            assert_eq!(colorful.current_color(), &Color::on());
        }
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        assert!(matches!(
            Colorful::from_names("Red, Purple", &registry()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_element_registry() {
        let mut elements = ElementRegistry::new();
        let a = elements.register("P1_A").unwrap();
        let b = elements
            .register_with_default("P1_B", Color::new("Dim", 10, 10, 10))
            .unwrap();
        assert_eq!((a, b), (0, 1));
        assert!(elements.register("P1_A").is_err());
        assert!(elements.register(" ").is_err());

        assert_eq!(elements.find("P1_B").unwrap(), b);
        assert!(matches!(elements.find("P2_A"), Err(Error::NotFound(_))));
        assert_eq!(elements.by_name("P1_A").unwrap().color(), Rgb::new(0, 0, 0));

        elements.seal();
        assert_eq!(elements.register("P2_A"), Err(Error::AlreadyLoaded));
        assert_eq!(
            elements.iter().map(|e| e.name()).collect::<Vec<_>>(),
            ["P1_A", "P1_B"]
        );
    }

    #[test]
    fn test_set_color_and_reset() {
        let mut elements = ElementRegistry::new();
        let id = elements.register("P1_A").unwrap();
        let red = Color::new("Red", 255, 0, 0);
        let white = Color::on();

        let element = elements.get_mut(id).unwrap();
        element.set_color(&red, Filter::Normal, 100);
        assert_eq!(element.color(), Rgb::new(255, 0, 0));
        element.set_color(&white, Filter::Combine, 50);
        assert_eq!(element.color(), Rgb::new(255, 128, 128));

        elements.reset_all();
        assert_eq!(elements.get(id).unwrap().color(), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_reset_restores_default_color() {
        let mut elements = ElementRegistry::new();
        let plain = elements.register("P1_A").unwrap();
        let dim = elements
            .register_with_default("P1_B", Color::new("Dim", 10, 10, 10))
            .unwrap();

        elements.set_all(&Color::new("Red", 255, 0, 0), Filter::Normal, 100);
        elements.reset_all();
        assert_eq!(elements.get(plain).unwrap().color(), Rgb::new(0, 0, 0));
        assert_eq!(elements.get(dim).unwrap().color(), Rgb::new(10, 10, 10));
        assert_eq!(elements.get(dim).unwrap().default_color().name(), "Dim");
    }

    #[test]
    fn test_groups() {
        let mut elements = ElementRegistry::new();
        let a = elements.register("P1_A").unwrap();
        let b = elements.register("P1_B").unwrap();

        let mut groups = GroupRegistry::new();
        groups.add("Player1", ["P1_A", "P1_B"], &elements).unwrap();
        assert_eq!(groups.get("Player1").unwrap().elements(), [a, b]);
        assert!(groups.add("Player1", ["P1_A"], &elements).is_err());
        assert!(matches!(
            groups.add("Player2", ["P2_A"], &elements),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(groups.get("Player2"), Err(Error::NotFound(_))));
        assert_eq!(groups.len(), 1);
    }
}
