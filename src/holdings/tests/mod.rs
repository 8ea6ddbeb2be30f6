mod holdings_calculator_tests;
