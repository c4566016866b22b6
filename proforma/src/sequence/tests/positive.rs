use crate::parse_test;

parse_test!(1, "PROTEOFORM");
parse_test!(2, "SEQ[info:test]UENCE");
parse_test!(3, "[Acetyl]-SEQUENCE-[Amidation]");
parse_test!(4, "[Phospho]?PROTEOFORM");
parse_test!(5, "PROT(EOSFORMS)[+19.0523]ISK");
parse_test!(6, "<13C>ATPEILTVNSIGQLK");
parse_test!(7, "{Glycan:Hex}EM[Hydroxylation]EVNESPEK");
parse_test!(8, "EM[Oxidation]EVEES[Phospho]PEK");
parse_test!(9, "EM[U:Oxidation]EVEES[U:Phospho]PEK");
parse_test!(10, "EM[+15.9949]EVEES[+79.9663]PEK");
parse_test!(11, "EM[U:+15.995]EVEES[Obs:+79.978]PEK");
parse_test!(12, "EM[R:L-methionine sulfone]EVEES[O-phospho-L-serine]PEK");
parse_test!(13, "EM[MOD:00719]EVEES[MOD:00046]PEK");
parse_test!(14, "EM[UNIMOD:35]EVEES[UNIMOD:56]PEK");
parse_test!(15, "EM[U:Cation:Fe[III]]EVEES[Phospho]PEK");
parse_test!(16, "EMEVTKSE[Formula:C2H2O]PEK");
parse_test!(17, "ELV[Glycan:HexNAc1Hex2]TPEK");
parse_test!(18, "EM[Oxidation|info:test]EVEES[Phospho]PEK");
parse_test!(19, "EM[info:a\\|b]EVEESPEK");
parse_test!(20, "EMEVTK[Phospho#g1]S[#g1]ESPEK");
parse_test!(21, "EM[Oxidation#g1(0.9)]EVEM[#g1(0.1)]K");
parse_test!(22, "PROT(EOS)[Phospho#g1]FORM(SISK)[#g1]");
parse_test!(23, "(?DQ)NGTWEM[Oxidation]ESNENFEGYM[Oxidation]K");
parse_test!(24, "<[S-carboxamidomethyl-L-cysteine]@C>ATPEILTCNSIGCLK");
parse_test!(25, "<[Carbamidomethyl]@C,M>PEPTCMK");
parse_test!(26, "<13C><15N>PEPTIDE");
parse_test!(27, "[Phospho]^2[Methyl]?PEPTIDE");
parse_test!(28, "{Glycan:Hex}{Glycan:NeuAc}EMEVNESPEK");
parse_test!(29, "[Acetyl]-EM[Oxidation]EVNESPEK-[Amidated]");
parse_test!(30, "ELVIS[Phospho|+79.966331]K");
parse_test!(31, "ELV(IS)[Phospho][info:x]K");
parse_test!(32, "(?EM)[Oxidation]EVEES[Phospho]PEK");
parse_test!(33, "EM[Oxidation]EVE(S[Phospho]PE)[+1]K");
parse_test!(34, "PRT[g1->]ESFRMS[<-g1]ISK");
parse_test!(35, "(?EOS)[#g1]K[Phospho#g1]");
parse_test!(36, "EMK[XLMOD:02000#XL1]EVTKSE[XLMOD:02010#XL2]SK[#XL1]PEK[#XL2]AR");
parse_test!(37, "EMEVTK[X:DSS#XL1]SESPEK[#XL1]");
parse_test!(38, "RTAAX[+367.0537]WT");
parse_test!(39, "{Glycan:Hex}[Phospho]?[Acetyl]-EMEVNES[Phospho]PEK");
parse_test!(40, "SEQUEN[Formula:[13C2]C-2H2N]CE");
parse_test!(41, "EMEVNESPEK[B:ac]");
parse_test!(42, "EM[G:G59626AS]K");
parse_test!(43, "NEEYN[GNO:G59626AS]K");
parse_test!(44, "<D>PEPTIDE");
parse_test!(45, "PEPTIDE[#g1]K[Oxidation#g1(0.25)]");
parse_test!(46, "EM[Oxidation][Phospho#g1]EVEM[#g1]K");

parse_test!(just_parse 1, "EM[ox]EVEES[INFO:x]PEK");
parse_test!(just_parse 2, "<Carbamidomethyl@C>PEPTCK");
parse_test!(just_parse 3, "[Phospho]^1?PEPTIDE");
parse_test!(just_parse 4, "EM[Oxidation#g1(0.90)]EVEM[#g1]K");
parse_test!(just_parse 5, "(E)[+1]K");
parse_test!(just_parse 6, "EM[obs:+15.99]K");
parse_test!(just_parse 7, "[Methyl]?{Glycan:Hex}PEPTIDE");
parse_test!(just_parse 8, "EM[Oxidation|Phospho#g1]EVEM[#g1]K");
parse_test!(just_parse 9, "{Glycan:Hex|info:labile}PEPTIDE");
